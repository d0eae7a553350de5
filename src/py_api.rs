//! # Python Bindings
//!
//! PyO3 bindings for driving the capture engine from a Python host.
//! Compiled only with the `python` feature. The binding layer is a thin
//! wrapper: sides travel as `"a"`/`"b"` strings, events as dicts, and the
//! board occupancy as a numpy array.

use numpy::PyArray2;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::EngineConfig;
use crate::engine::CaptureEngine;
use crate::events::EngineEvent;
use crate::piece::{PieceId, Side, StatBlock, Vec2};

fn parse_side(side: &str) -> PyResult<Side> {
    match side {
        "a" | "A" => Ok(Side::A),
        "b" | "B" => Ok(Side::B),
        other => Err(PyValueError::new_err(format!(
            "Invalid side: {:?}. Use \"a\" or \"b\".",
            other
        ))),
    }
}

fn side_str(side: Side) -> &'static str {
    match side {
        Side::A => "a",
        Side::B => "b",
    }
}

/// Python-facing wrapper around [`CaptureEngine`].
#[pyclass(name = "CaptureEngine")]
pub struct PyCaptureEngine {
    engine: CaptureEngine,
}

#[pymethods]
impl PyCaptureEngine {
    /// Create an engine for a `cols x rows` board.
    #[new]
    #[pyo3(signature = (cols=4, rows=4))]
    fn new(cols: usize, rows: usize) -> PyResult<Self> {
        let config = EngineConfig::with_dims(cols, rows).map_err(PyValueError::new_err)?;
        Ok(Self {
            engine: CaptureEngine::new(config),
        })
    }

    /// Place a piece. Returns the new piece id.
    #[pyo3(signature = (top, right, down, left, owner, x, y))]
    #[allow(clippy::too_many_arguments)]
    fn place(
        &mut self,
        top: u32,
        right: u32,
        down: u32,
        left: u32,
        owner: &str,
        x: f32,
        y: f32,
    ) -> PyResult<u32> {
        let side = parse_side(owner)?;
        self.engine
            .place(StatBlock::new(top, right, down, left), side, Vec2::new(x, y))
            .map(|id| id.0)
            .map_err(PyValueError::new_err)
    }

    /// Advance the engine clock by `dt` seconds.
    fn advance(&mut self, dt: f64) {
        self.engine.advance(dt);
    }

    /// Run the clock until all cascades settle.
    fn settle(&mut self) {
        self.engine.settle();
    }

    /// Drain pending events as a list of dicts.
    fn drain_events(&mut self, py: Python<'_>) -> PyResult<Vec<Py<PyDict>>> {
        let mut out = Vec::new();
        for event in self.engine.drain_events() {
            let dict = PyDict::new(py);
            match event {
                EngineEvent::Captured {
                    piece,
                    new_owner,
                    direction,
                } => {
                    dict.set_item("type", "captured")?;
                    dict.set_item("piece", piece.0)?;
                    dict.set_item("new_owner", side_str(new_owner))?;
                    dict.set_item("direction", direction.to_string())?;
                }
                EngineEvent::BoardFull => {
                    dict.set_item("type", "board_full")?;
                }
            }
            out.push(dict.unbind());
        }
        Ok(out)
    }

    fn chains_in_progress(&self) -> bool {
        self.engine.chains_in_progress()
    }

    fn clock(&self) -> f64 {
        self.engine.clock()
    }

    fn turn_started(&mut self) {
        self.engine.turn_started();
    }

    fn turn_ended(&mut self) {
        self.engine.turn_ended();
    }

    /// Effective side of a piece, or `None` for a stale id.
    fn side_of(&self, piece: u32) -> Option<&'static str> {
        self.engine.side_of(PieceId(piece)).map(side_str)
    }

    fn piece_count(&self) -> usize {
        self.engine.piece_count()
    }

    fn is_board_full(&self) -> bool {
        self.engine.is_board_full()
    }

    /// Rewrite a piece's directional strengths.
    fn set_stats(&mut self, piece: u32, top: u32, right: u32, down: u32, left: u32) -> PyResult<()> {
        self.engine
            .set_stats(PieceId(piece), StatBlock::new(top, right, down, left))
            .map_err(PyValueError::new_err)
    }

    /// Remove a piece from the board.
    fn remove(&mut self, piece: u32) -> PyResult<()> {
        self.engine.remove(PieceId(piece)).map_err(PyValueError::new_err)
    }

    fn clear_board(&mut self) {
        self.engine.clear_board();
    }

    /// Board occupancy as a numpy array of piece ids (`-1` = empty).
    fn occupancy_grid<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<i32>> {
        PyArray2::from_array(py, &self.engine.occupancy_grid())
    }
}

/// Capture engine bindings
#[pymodule]
#[pyo3(name = "tileclash")]
fn tileclash_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCaptureEngine>()?;
    m.add("SIDE_A", "a")?;
    m.add("SIDE_B", "b")?;
    Ok(())
}
