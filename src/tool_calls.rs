//! Declaring local functions to the model and running the calls it makes.
//!
//! A [`ToolDescriptor`] renders to the API's function-call declaration, a
//! [`Tool`] pairs each descriptor with the handler that implements it.

pub mod argument;
pub mod descriptor;
pub mod tool;

pub use argument::ToolArgument;
pub use descriptor::ToolDescriptor;
pub use tool::{Arguments, Dispatch, Tool};
