//! Named presets selectable from the settings file
//!
//! Position setters and matrix generators are looked up by the display
//! names used in `settings.toml`.

use crate::color_matrix::{
    ChainsMatrixGenerator, MatrixGenerator, RandomMatrixGenerator, SnakesMatrixGenerator,
    SymmetricMatrixGenerator, ZeroMatrixGenerator,
};
use crate::error::{Result, SimError};
use crate::particle::{
    CenterPositionSetter, PositionSetter, RainbowRingPositionSetter, RingPositionSetter,
    UniformPositionSetter,
};

/// Manages a collection of named items with an active selection
pub struct SelectionManager<T> {
    /// List of named items
    items: Vec<NamedItem<T>>,
    /// Index of the currently active item
    active_index: usize,
}

/// A named item in a selection manager
pub struct NamedItem<T> {
    pub name: String,
    pub object: T,
}

impl<T> SelectionManager<T> {
    /// Creates a new selection manager with the given (name, object) pairs
    pub fn new(items: Vec<(String, T)>) -> Self {
        let items = items
            .into_iter()
            .map(|(name, object)| NamedItem { name, object })
            .collect();
        Self {
            items,
            active_index: 0,
        }
    }

    /// Returns a reference to the currently active item
    pub fn get_active(&self) -> &T {
        &self.items[self.active_index].object
    }

    pub fn get_active_name(&self) -> &str {
        &self.items[self.active_index].name
    }

    /// Returns a vector of all item names
    pub fn get_item_names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name.as_str()).collect()
    }

    /// Activates the item called `name` (case-insensitive). Returns false and
    /// keeps the current selection if nothing matches.
    pub fn select(&mut self, name: &str) -> bool {
        match self
            .items
            .iter()
            .position(|item| item.name.eq_ignore_ascii_case(name))
        {
            Some(index) => {
                self.active_index = index;
                true
            }
            None => false,
        }
    }
}

pub type PositionSetterFactory = fn() -> Box<dyn PositionSetter>;
pub type MatrixGeneratorFactory = fn() -> Box<dyn MatrixGenerator>;

fn uniform() -> Box<dyn PositionSetter> {
    Box::new(UniformPositionSetter)
}

fn center() -> Box<dyn PositionSetter> {
    Box::new(CenterPositionSetter)
}

fn ring() -> Box<dyn PositionSetter> {
    Box::new(RingPositionSetter)
}

fn rainbow_ring() -> Box<dyn PositionSetter> {
    Box::new(RainbowRingPositionSetter)
}

fn random() -> Box<dyn MatrixGenerator> {
    Box::new(RandomMatrixGenerator)
}

fn symmetric() -> Box<dyn MatrixGenerator> {
    Box::new(SymmetricMatrixGenerator)
}

fn chains() -> Box<dyn MatrixGenerator> {
    Box::new(ChainsMatrixGenerator)
}

fn snakes() -> Box<dyn MatrixGenerator> {
    Box::new(SnakesMatrixGenerator)
}

fn zero() -> Box<dyn MatrixGenerator> {
    Box::new(ZeroMatrixGenerator)
}

pub fn position_setters() -> SelectionManager<PositionSetterFactory> {
    SelectionManager::new(vec![
        ("Uniform".to_string(), uniform as PositionSetterFactory),
        ("Center".to_string(), center as PositionSetterFactory),
        ("Ring".to_string(), ring as PositionSetterFactory),
        ("Rainbow Ring".to_string(), rainbow_ring as PositionSetterFactory),
    ])
}

pub fn matrix_generators() -> SelectionManager<MatrixGeneratorFactory> {
    SelectionManager::new(vec![
        ("Random".to_string(), random as MatrixGeneratorFactory),
        ("Symmetric".to_string(), symmetric as MatrixGeneratorFactory),
        ("Chains".to_string(), chains as MatrixGeneratorFactory),
        ("Snakes".to_string(), snakes as MatrixGeneratorFactory),
        ("Zero".to_string(), zero as MatrixGeneratorFactory),
    ])
}

pub fn position_setter(name: &str) -> Result<Box<dyn PositionSetter>> {
    let mut setters = position_setters();
    if setters.select(name) {
        Ok(setters.get_active()())
    } else {
        Err(SimError::UnknownPreset {
            kind: "position setter",
            name: name.to_string(),
        })
    }
}

pub fn matrix_generator(name: &str) -> Result<Box<dyn MatrixGenerator>> {
    let mut generators = matrix_generators();
    if generators.select(name) {
        Ok(generators.get_active()())
    } else {
        Err(SimError::UnknownPreset {
            kind: "matrix generator",
            name: name.to_string(),
        })
    }
}
