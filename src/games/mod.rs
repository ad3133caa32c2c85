//! Game implementations.

pub mod number_guess;
