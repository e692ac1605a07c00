//! Game bindings for Python.

use std::sync::Arc;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::{ActionId, GameConfig, PlayerId};
use crate::games::castillo::CastilloState;
use crate::games::el_grande::{ElGrandeBuilder, GameState};
use crate::rules::SearchGame;

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Python wrapper for an El Grande game.
#[pyclass(name = "ElGrande")]
#[derive(Clone)]
pub struct PyElGrande {
    state: GameState,
}

#[pymethods]
impl PyElGrande {
    /// Create a new game.
    ///
    /// # Arguments
    /// - player_count: Number of players (2-5)
    /// - seed: RNG seed for the setup
    /// - grande_selection: Let players place grandes instead of random placement
    /// - config_json: Optional configuration replacing the standard game
    #[new]
    #[pyo3(signature = (player_count = 4, seed = 42, grande_selection = false, config_json = None))]
    fn new(player_count: usize, seed: u64, grande_selection: bool, config_json: Option<&str>) -> PyResult<Self> {
        let mut builder = ElGrandeBuilder::new()
            .player_count(player_count)
            .grande_selection(grande_selection);
        if let Some(json) = config_json {
            builder = builder.config(Arc::new(GameConfig::from_json(json).map_err(value_error)?));
        }
        let state = builder.build(seed).map_err(value_error)?;
        Ok(Self { state })
    }

    /// Load a game from a JSON snapshot.
    #[staticmethod]
    #[pyo3(signature = (snapshot, config_json = None))]
    fn from_json(snapshot: &str, config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(json).map_err(value_error)?,
            None => GameConfig::standard(),
        };
        let state = GameState::from_json(Arc::new(config), snapshot).map_err(value_error)?;
        Ok(Self { state })
    }

    fn to_json(&self) -> PyResult<String> {
        self.state.to_json().map_err(value_error)
    }

    fn to_bytes(&self) -> PyResult<Vec<u8>> {
        self.state.to_bytes().map_err(value_error)
    }

    #[staticmethod]
    fn from_bytes(bytes: Vec<u8>) -> PyResult<Self> {
        let state = GameState::from_bytes(Arc::new(GameConfig::standard()), &bytes).map_err(value_error)?;
        Ok(Self { state })
    }

    fn legal_actions(&self) -> Vec<ActionId> {
        self.state.legal_actions()
    }

    fn legal_actions_mask(&self) -> Vec<bool> {
        SearchGame::legal_actions_mask(&self.state)
    }

    /// Apply an action; ids outside the legal set are ignored.
    fn apply_action(&mut self, action: ActionId) {
        self.state.apply_action(action);
    }

    /// Seat of the player to move, or None once the game is over.
    fn current_player(&self) -> Option<u8> {
        self.state.current_player().map(|p| p.0)
    }

    fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    fn returns(&self) -> Vec<f64> {
        self.state.returns()
    }

    fn scores(&self) -> Vec<i32> {
        self.state.scores().as_slice().to_vec()
    }

    fn history(&self) -> Vec<ActionId> {
        SearchGame::history(&self.state)
    }

    fn action_to_string(&self, player: u8, action: ActionId) -> String {
        self.state.action_to_string(PlayerId(player), action)
    }

    #[getter]
    fn num_distinct_actions(&self) -> usize {
        SearchGame::num_distinct_actions(&self.state)
    }

    #[getter]
    fn player_count(&self) -> usize {
        self.state.player_count()
    }

    #[getter]
    fn round(&self) -> u8 {
        self.state.round()
    }

    #[getter]
    fn phase(&self) -> &'static str {
        self.state.phase().name()
    }

    /// Castillo subgame seen by `player`.
    fn castillo(&self, player: u8) -> PyResult<PyCastillo> {
        let snap = self.state.castillo_snapshot(PlayerId(player));
        let state = CastilloState::from_snapshot(&snap).map_err(value_error)?;
        Ok(PyCastillo { state })
    }

    /// Independent copy for simulation.
    fn copy(&self) -> Self {
        Clone::clone(self)
    }

    fn __repr__(&self) -> String {
        format!(
            "ElGrande(round={}, phase={}, current={:?})",
            self.state.round(),
            self.state.phase(),
            self.current_player()
        )
    }
}

/// Python wrapper for the Castillo subgame.
#[pyclass(name = "Castillo")]
#[derive(Clone)]
pub struct PyCastillo {
    state: CastilloState,
}

#[pymethods]
impl PyCastillo {
    fn legal_actions(&self) -> Vec<ActionId> {
        self.state.legal_actions()
    }

    fn apply_action(&mut self, action: ActionId) {
        self.state.apply_action(action);
    }

    fn current_player(&self) -> Option<u8> {
        self.state.current_player().map(|p| p.0)
    }

    fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    fn returns(&self) -> Vec<f64> {
        self.state.returns()
    }

    fn copy(&self) -> Self {
        Clone::clone(self)
    }
}
