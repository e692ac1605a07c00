//! Python bindings for the El Grande engine.
//!
//! A thin surface over the search contract: integer actions in,
//! returns and descriptions out.
//!
//! # Quick Start
//!
//! ```python
//! import el_grande
//!
//! game = el_grande.ElGrande(player_count=4, seed=42)
//! while not game.is_terminal():
//!     game.apply_action(game.legal_actions()[0])
//! print(game.returns())
//! ```

use pyo3::prelude::*;

mod py_games;

pub use py_games::*;

/// el_grande: El Grande game-state engine.
#[pymodule]
fn el_grande(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyElGrande>()?;
    m.add_class::<PyCastillo>()?;
    Ok(())
}
