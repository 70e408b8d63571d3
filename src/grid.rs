use crate::protocol::PAD_COUNT;

/// Width and height of the pad grid
pub const GRID_SIZE: i32 = 8;

/// A 2d point on the pad grid. `(0, 0)` is the bottom-left pad, `x` grows to the right and `y`
/// grows upwards, so that pad index `y * 8 + x` matches the device's note numbering. For
/// convenience, the coordinates can be negative or beyond the grid.
///
/// [`GridPos`] implements various mathematical operator traits for the `(i32, i32)` tuple.
/// Therefore it's possible move a position around by adding or subtracting (x, y) coordinate
/// tuples:
///
/// ```rust
/// # use apc_mini::GridPos;
/// let pos = GridPos { x: 3, y: 6 };
///
/// assert_eq!(pos + (4, 4), GridPos { x: 7, y: 10 });
/// assert_eq!(pos - (4, 4), GridPos { x: -1, y: 2 });
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position of the pad with the given index, if there is such a pad
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= PAD_COUNT {
            return None;
        }
        let index = index as i32;
        Some(Self {
            x: index % GRID_SIZE,
            y: index / GRID_SIZE,
        })
    }

    /// The index of the pad at this position, if the position is on the grid
    pub fn to_index(self) -> Option<usize> {
        if self.is_on_grid() {
            Some((self.y * GRID_SIZE + self.x) as usize)
        } else {
            None
        }
    }

    pub fn is_on_grid(self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }

    /// Wrap the position around the grid edges, torus-style
    pub fn wrapped(self) -> Self {
        Self {
            x: self.x.rem_euclid(GRID_SIZE),
            y: self.y.rem_euclid(GRID_SIZE),
        }
    }

    /// Return a copy of this [`GridPos`], moved upwards by a certain number of steps
    pub fn up(self, steps: i32) -> Self {
        Self {
            x: self.x,
            y: self.y + steps,
        }
    }

    /// Return a copy of this [`GridPos`], moved downwards by a certain number of steps
    pub fn down(self, steps: i32) -> Self {
        Self {
            x: self.x,
            y: self.y - steps,
        }
    }

    /// Return a copy of this [`GridPos`], moved left by a certain number of steps
    pub fn left(self, steps: i32) -> Self {
        Self {
            x: self.x - steps,
            y: self.y,
        }
    }

    /// Return a copy of this [`GridPos`], moved right by a certain number of steps
    pub fn right(self, steps: i32) -> Self {
        Self {
            x: self.x + steps,
            y: self.y,
        }
    }

    /// Returns an array of the four surrounding neighbors of this position
    pub fn neighbors_4(self) -> [Self; 4] {
        [self.up(1), self.right(1), self.down(1), self.left(1)]
    }
}

impl std::ops::Add<(i32, i32)> for GridPos {
    type Output = Self;

    fn add(self, offset: (i32, i32)) -> Self {
        let (x_offset, y_offset) = offset;
        Self {
            x: self.x + x_offset,
            y: self.y + y_offset,
        }
    }
}

impl std::ops::AddAssign<(i32, i32)> for GridPos {
    fn add_assign(&mut self, offset: (i32, i32)) {
        let (x_offset, y_offset) = offset;
        self.x += x_offset;
        self.y += y_offset;
    }
}

impl std::ops::Sub<(i32, i32)> for GridPos {
    type Output = Self;

    fn sub(self, offset: (i32, i32)) -> Self {
        let (x_offset, y_offset) = offset;
        Self {
            x: self.x - x_offset,
            y: self.y - y_offset,
        }
    }
}
