use crate::{
    config::TurtleConfig,
    lsystem::symbol::{Action, AngleSlot, Axis, SymbolTable},
};
use log::{debug, warn};
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The turtle's local coordinate frame. Each **row** of the matrix is one local
/// axis, in world coordinates. Rotations are applied in the turtle's own frame,
/// so a yaw after a pitch turns about the pitched Y axis, not the world one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame(Matrix3<f64>);

impl Frame {
    /// Local axes aligned with the world axes
    pub fn identity() -> Self {
        Self(Matrix3::identity())
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    /// Rotate the frame about one of the unit axes, by the given number of
    /// degrees. Positive angles are counterclockwise when looking down the
    /// axis towards the origin.
    pub fn rotate(&mut self, axis: Axis, degrees: f64) {
        let axis = match axis {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        };
        let rotation = Rotation3::from_axis_angle(&axis, degrees.to_radians());
        self.0 = rotation.matrix() * self.0;
    }

    /// The direction the turtle moves in: the local Z axis, normalized
    pub fn heading(&self) -> Vector3<f64> {
        self.0.row(2).transpose().normalize()
    }
}

/// Identifies a point within a [PolylineSet]: which polyline, and which point
/// within it
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub polyline: usize,
    pub point: usize,
}

/// Everything about the turtle that a branch saves and restores. This is
/// plain data, so a saved snapshot can never be affected by whatever happens
/// inside the branch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TurtleState {
    pub position: Point3<f64>,
    pub heading: Vector3<f64>,
    pub frame: Frame,
    /// The polyline point that the turtle is sitting on. A drawn move
    /// extends that polyline, if the point is still its last one.
    pub cursor: Cursor,
}

impl TurtleState {
    fn new(origin: Point3<f64>) -> Self {
        let frame = Frame::identity();
        Self {
            position: origin,
            heading: frame.heading(),
            frame,
            cursor: Cursor {
                polyline: 0,
                point: 0,
            },
        }
    }

    fn rotate(&mut self, axis: Axis, degrees: f64) {
        self.frame.rotate(axis, degrees);
        self.heading = self.frame.heading();
    }
}

/// LIFO stack of saved turtle states. Popping an empty stack isn't an error,
/// just a no-op that gets counted so the caller can report it.
#[derive(Clone, Debug, Default)]
pub struct BranchStack {
    states: Vec<TurtleState>,
    unmatched_pops: usize,
}

impl BranchStack {
    pub fn push(&mut self, state: TurtleState) {
        self.states.push(state);
    }

    pub fn pop(&mut self) -> Option<TurtleState> {
        let state = self.states.pop();
        if state.is_none() {
            self.unmatched_pops += 1;
        }
        state
    }

    /// Number of currently open branches
    pub fn depth(&self) -> usize {
        self.states.len()
    }

    /// Number of pops so far that found the stack empty
    pub fn unmatched_pops(&self) -> usize {
        self.unmatched_pops
    }
}

/// An ordered sequence of connected points. Consecutive points form the
/// segments of the line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Point3<f64>>,
}

impl Polyline {
    fn new(start: Point3<f64>) -> Self {
        Self {
            points: vec![start],
        }
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    fn is_tail(&self, index: usize) -> bool {
        index + 1 == self.points.len()
    }
}

/// Every polyline a turtle produced, in creation order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolylineSet {
    polylines: Vec<Polyline>,
}

impl PolylineSet {
    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Polyline> {
        self.polylines.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Polyline> {
        self.polylines.iter()
    }

    /// Total number of drawn segments across all polylines
    pub fn segment_count(&self) -> usize {
        self.iter().map(Polyline::segment_count).sum()
    }

    /// Start a new polyline at the given point, and return a cursor to it
    fn start(&mut self, point: Point3<f64>) -> Cursor {
        self.polylines.push(Polyline::new(point));
        Cursor {
            polyline: self.polylines.len() - 1,
            point: 0,
        }
    }

    /// Add a point after the cursor, and return a cursor to the new point.
    /// If the cursor isn't at the end of its polyline (because a branch ended
    /// and moved the turtle back to an earlier point), appending there would
    /// connect the wrong points. Instead, fork a new polyline from the cursor.
    fn extend(&mut self, cursor: Cursor, point: Point3<f64>) -> Cursor {
        let polyline = &mut self.polylines[cursor.polyline];
        if polyline.is_tail(cursor.point) {
            polyline.points.push(point);
            Cursor {
                polyline: cursor.polyline,
                point: cursor.point + 1,
            }
        } else {
            let start = polyline.points[cursor.point];
            let forked = self.start(start);
            self.extend(forked, point)
        }
    }
}

/// The output of a single turtle pass over a control string
#[derive(Clone, Debug)]
pub struct TurtleRun {
    pub polylines: PolylineSet,
    /// Where the turtle ended up, after the last symbol
    pub final_state: TurtleState,
    /// Number of `]` symbols that had no matching `[`
    pub unmatched_pops: usize,
}

/// A turtle graphics interpreter. It walks a control string one character at
/// a time, moving and rotating according to each symbol, and records the path
/// it draws as a set of polylines. Characters it doesn't understand, either
/// because they aren't turtle symbols or because they're outside this
/// turtle's capabilities, are skipped.
#[derive(Clone, Debug)]
pub struct Turtle {
    config: TurtleConfig,
    symbols: SymbolTable,
}

impl Turtle {
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            symbols: SymbolTable::new(config.capabilities),
            config,
        }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Trace a control string. The RNG is only consumed when the config has
    /// ranged angles or steps: one draw per symbol that uses a ranged value.
    pub fn interpret<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        commands: &str,
    ) -> TurtleRun {
        let mut walk = Walk::new(Point3::from(self.config.origin));
        for c in commands.chars() {
            if let Some(symbol) = self.symbols.get(c) {
                walk.apply(&self.config, rng, symbol.action());
            }
        }

        let run = walk.finish();
        debug!(
            "Traced {} polylines ({} segments) from {} symbols",
            run.polylines.len(),
            run.polylines.segment_count(),
            commands.len()
        );
        if run.unmatched_pops > 0 {
            warn!(
                "Ignored {} branch end(s) with no open branch",
                run.unmatched_pops
            );
        }
        run
    }
}

/// Mutable state for one pass of the turtle
struct Walk {
    state: TurtleState,
    stack: BranchStack,
    polylines: PolylineSet,
}

impl Walk {
    fn new(origin: Point3<f64>) -> Self {
        let mut polylines = PolylineSet::default();
        let cursor = polylines.start(origin);
        let mut state = TurtleState::new(origin);
        state.cursor = cursor;
        Self {
            state,
            stack: BranchStack::default(),
            polylines,
        }
    }

    fn apply<R: Rng + ?Sized>(
        &mut self,
        config: &TurtleConfig,
        rng: &mut R,
        action: Action,
    ) {
        match action {
            Action::Advance { draw } => {
                let step = config.step.sample(rng);
                self.advance(step, draw);
            }
            Action::Rotate { axis, angle, sign } => {
                let degrees = match angle {
                    AngleSlot::Pitch => config.angles.pitch.sample(rng),
                    AngleSlot::Yaw => config.angles.yaw.sample(rng),
                    AngleSlot::Roll => config.angles.roll.sample(rng),
                    AngleSlot::HalfTurn => 180.0,
                };
                self.state.rotate(axis, sign * degrees);
            }
            Action::Push => {
                self.stack.push(self.state);
                self.state.cursor = self.polylines.start(self.state.position);
            }
            Action::Pop => {
                if let Some(saved) = self.stack.pop() {
                    self.state = saved;
                }
            }
        }
    }

    fn advance(&mut self, step: f64, draw: bool) {
        let end = self.state.position + self.state.heading * step;
        self.state.cursor = if draw {
            self.polylines.extend(self.state.cursor, end)
        } else {
            self.polylines.start(end)
        };
        self.state.position = end;
    }

    fn finish(self) -> TurtleRun {
        if self.stack.depth() > 0 {
            debug!("{} branch(es) never closed", self.stack.depth());
        }
        TurtleRun {
            polylines: self.polylines,
            final_state: self.state,
            unmatched_pops: self.stack.unmatched_pops(),
        }
    }
}
