use std::collections::BTreeMap;

use crate::error::Fault;

/// Writes landing further than this past the dense end go to the sparse map.
const DENSE_GAP: usize = 4096;

/// Growable, zero-filled machine memory.
///
/// Addresses are signed because they come straight out of program data.
/// The program image and anything written near it live in a dense vector.
/// Isolated writes far beyond it are kept sparse so that a computed address
/// like `10^12` does not force a terabyte allocation. Reads never allocate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<i64>,
    sparse: BTreeMap<usize, i64>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_program(program: &[i64]) -> Self {
        Self {
            cells: program.to_vec(),
            sparse: BTreeMap::new(),
        }
    }

    pub fn read(&self, address: i64) -> Result<i64, Fault> {
        let idx = index(address)?;
        Ok(match self.cells.get(idx) {
            Some(&value) => value,
            None => self.sparse.get(&idx).copied().unwrap_or(0),
        })
    }

    pub fn write(&mut self, address: i64, value: i64) -> Result<(), Fault> {
        let idx = index(address)?;
        let len = self.cells.len();
        if idx < len {
            self.cells[idx] = value;
        } else if idx - len <= DENSE_GAP {
            self.grow_to(idx + 1);
            self.cells[idx] = value;
        } else {
            self.sparse.insert(idx, value);
        }
        Ok(())
    }

    /// Extend the dense region to `new_len` cells, absorbing any sparse
    /// cells that now fall inside it.
    fn grow_to(&mut self, new_len: usize) {
        self.cells.resize(new_len, 0);
        let beyond = self.sparse.split_off(&new_len);
        let absorbed = std::mem::replace(&mut self.sparse, beyond);
        for (idx, value) in absorbed {
            self.cells[idx] = value;
        }
    }

    /// Length of the dense region. Sparse cells are not counted.
    pub fn dense_len(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell has been stored anywhere, dense or sparse.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.sparse.is_empty()
    }

    /// The dense region. Sparse cells written far past it are not included.
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }
}

fn index(address: i64) -> Result<usize, Fault> {
    usize::try_from(address).map_err(|_| Fault::InvalidAddress(address))
}
