use crate::config::Capabilities;
use fnv::FnvHashMap;
use strum::{EnumIter, IntoEnumIterator};

/// A turtle command. Each variant corresponds to exactly one character of the
/// control string. Characters that don't map to a symbol (e.g. the `X` helper
/// symbols that only exist to drive rule expansion) are skipped by the turtle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Symbol {
    /// `F` - move forward, drawing a segment
    Forward,
    /// `f` - move forward with the pen up
    Move,
    /// `+` - yaw left
    YawLeft,
    /// `-` - yaw right
    YawRight,
    /// `&` - pitch down
    PitchDown,
    /// `^` - pitch up
    PitchUp,
    /// `\` - roll left
    RollLeft,
    /// `/` - roll right
    RollRight,
    /// `|` - turn around
    TurnAround,
    /// `[` - save state and start a branch
    PushBranch,
    /// `]` - end a branch and restore the saved state
    PopBranch,
}

/// One of the three local axes of the turtle's frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Which configured angle a rotation draws its magnitude from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AngleSlot {
    Pitch,
    Yaw,
    Roll,
    /// A fixed half turn, not configurable
    HalfTurn,
}

/// What the turtle does for a symbol. Every rotation symbol reduces to the same
/// operation with different data, so the interpreter only needs one code path
/// per action rather than one per character.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    /// Translate along the heading. `draw` controls whether the pen is down.
    Advance { draw: bool },
    /// Rotate the frame about one of its own axes. `sign` is applied to the
    /// magnitude drawn from `angle`.
    Rotate {
        axis: Axis,
        angle: AngleSlot,
        sign: f64,
    },
    Push,
    Pop,
}

impl Symbol {
    /// The control string character for this symbol
    pub fn to_char(self) -> char {
        match self {
            Self::Forward => 'F',
            Self::Move => 'f',
            Self::YawLeft => '+',
            Self::YawRight => '-',
            Self::PitchDown => '&',
            Self::PitchUp => '^',
            Self::RollLeft => '\\',
            Self::RollRight => '/',
            Self::TurnAround => '|',
            Self::PushBranch => '[',
            Self::PopBranch => ']',
        }
    }

    /// The action this symbol performs. Rotation directions follow the usual
    /// turtle convention: a left yaw is a negative rotation about local Y, a
    /// downward pitch is positive about local X, a left roll is negative about
    /// local Z.
    pub fn action(self) -> Action {
        let rotate = |axis, angle, sign| Action::Rotate { axis, angle, sign };
        match self {
            Self::Forward => Action::Advance { draw: true },
            Self::Move => Action::Advance { draw: false },
            Self::YawLeft => rotate(Axis::Y, AngleSlot::Yaw, -1.0),
            Self::YawRight => rotate(Axis::Y, AngleSlot::Yaw, 1.0),
            Self::PitchDown => rotate(Axis::X, AngleSlot::Pitch, 1.0),
            Self::PitchUp => rotate(Axis::X, AngleSlot::Pitch, -1.0),
            Self::RollLeft => rotate(Axis::Z, AngleSlot::Roll, -1.0),
            Self::RollRight => rotate(Axis::Z, AngleSlot::Roll, 1.0),
            Self::TurnAround => rotate(Axis::Y, AngleSlot::HalfTurn, 1.0),
            Self::PushBranch => Action::Push,
            Self::PopBranch => Action::Pop,
        }
    }

    /// Is this symbol available to a turtle with the given capabilities?
    /// Drawing and yaw are always available.
    pub fn is_enabled(self, capabilities: Capabilities) -> bool {
        match self {
            Self::Forward | Self::YawLeft | Self::YawRight => true,
            Self::Move => capabilities.pen_up,
            Self::PushBranch | Self::PopBranch => capabilities.branching,
            Self::PitchDown
            | Self::PitchUp
            | Self::RollLeft
            | Self::RollRight
            | Self::TurnAround => capabilities.three_d,
        }
    }
}

/// Lookup table from control string characters to the symbols a particular
/// turtle understands. Built once per turtle from its capabilities, so the
/// interpreter loop is a single map lookup per character.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    symbols: FnvHashMap<char, Symbol>,
}

impl SymbolTable {
    pub fn new(capabilities: Capabilities) -> Self {
        let symbols = Symbol::iter()
            .filter(|symbol| symbol.is_enabled(capabilities))
            .map(|symbol| (symbol.to_char(), symbol))
            .collect();
        Self { symbols }
    }

    /// Get the symbol for a character, or `None` if this table ignores it
    pub fn get(&self, c: char) -> Option<Symbol> {
        self.symbols.get(&c).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chars_unique() {
        let mut chars: Vec<char> = Symbol::iter().map(Symbol::to_char).collect();
        chars.sort_unstable();
        chars.dedup();
        assert_eq!(chars.len(), Symbol::iter().count());
    }

    #[test]
    fn test_table_tiers() {
        let draw = SymbolTable::new(Capabilities::DRAW_2D);
        assert_eq!(draw.len(), 3);
        assert_eq!(draw.get('F'), Some(Symbol::Forward));
        assert_eq!(draw.get('f'), None);
        assert_eq!(draw.get('['), None);

        let skip = SymbolTable::new(Capabilities::SKIP_2D);
        assert_eq!(skip.get('f'), Some(Symbol::Move));
        assert_eq!(skip.get('&'), None);

        let branching = SymbolTable::new(Capabilities::BRANCHING_2D);
        assert_eq!(branching.get('['), Some(Symbol::PushBranch));
        assert_eq!(branching.get(']'), Some(Symbol::PopBranch));
        assert_eq!(branching.get('|'), None);

        let full = SymbolTable::new(Capabilities::FULL_3D);
        assert_eq!(full.len(), Symbol::iter().count());
        assert_eq!(full.get('\\'), Some(Symbol::RollLeft));
        assert_eq!(full.get('X'), None);
    }

    #[test]
    fn test_rotation_actions() {
        assert_eq!(
            Symbol::YawLeft.action(),
            Action::Rotate {
                axis: Axis::Y,
                angle: AngleSlot::Yaw,
                sign: -1.0
            }
        );
        assert_eq!(
            Symbol::PitchDown.action(),
            Action::Rotate {
                axis: Axis::X,
                angle: AngleSlot::Pitch,
                sign: 1.0
            }
        );
        assert_eq!(Symbol::Move.action(), Action::Advance { draw: false });
    }
}
