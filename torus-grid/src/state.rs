use crate::error::GridError;

/// Opaque, comparable token naming one row of a [`StateTable`].
///
/// The rule engine never inspects key identity; it reads row values and
/// writes only the table's canonical dead/alive keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateKey(pub u8);

/// One table row: a key, its liveness contribution, and an opaque display
/// payload (RGBA by convention) passed through to the paint callback.
#[derive(Clone, Copy, Debug)]
pub struct StateRow {
    pub key: StateKey,
    pub value: u8,
    pub tag: [u8; 4],
}

/// Fixed mapping from state keys to `(value, display tag)`.
///
/// A table may carry extra rows beyond dead/alive, e.g. a value-1 "zombie"
/// that counts as a live neighbor but is only ever set externally.
#[derive(Clone, Debug)]
pub struct StateTable {
    rows: Vec<StateRow>,
    dead: StateKey,
    alive: StateKey,
}

impl StateTable {
    /// Validates and builds a table. Keys must be unique, values must be 0
    /// or 1, and at least one row of each value must exist. The first
    /// value-0 row is the canonical dead key, the first value-1 row the
    /// canonical alive key.
    pub fn new(rows: Vec<StateRow>) -> Result<Self, GridError> {
        for (i, row) in rows.iter().enumerate() {
            if row.value > 1 {
                return Err(GridError::InvalidStateTable("state value must be 0 or 1"));
            }
            if rows[..i].iter().any(|earlier| earlier.key == row.key) {
                return Err(GridError::InvalidStateTable("duplicate state key"));
            }
        }
        let dead = Self::first_with_value(&rows, 0)
            .ok_or(GridError::InvalidStateTable("no dead (value 0) state"))?;
        let alive = Self::first_with_value(&rows, 1)
            .ok_or(GridError::InvalidStateTable("no alive (value 1) state"))?;
        Ok(Self { rows, dead, alive })
    }

    /// The classic two-state table.
    pub fn conway() -> Self {
        Self::new(vec![
            StateRow {
                key: StateKey(0),
                value: 0,
                tag: [0x00, 0x00, 0x40, 0xff],
            },
            StateRow {
                key: StateKey(1),
                value: 1,
                tag: [0x80, 0x80, 0x80, 0xff],
            },
        ])
        .unwrap_or_else(|err| panic!("built-in state table invalid: {err}"))
    }

    fn first_with_value(rows: &[StateRow], value: u8) -> Option<StateKey> {
        rows.iter().find(|row| row.value == value).map(|row| row.key)
    }

    fn row(&self, key: StateKey) -> &StateRow {
        self.rows
            .iter()
            .find(|row| row.key == key)
            .unwrap_or_else(|| panic!("unknown state key {key:?}"))
    }

    pub fn value_of(&self, key: StateKey) -> u8 {
        self.row(key).value
    }

    pub fn tag_of(&self, key: StateKey) -> [u8; 4] {
        self.row(key).tag
    }

    pub fn dead_key(&self) -> StateKey {
        self.dead
    }

    pub fn alive_key(&self) -> StateKey {
        self.alive
    }
}
