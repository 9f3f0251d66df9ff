pub mod generator;
pub mod responder;

pub use generator::NackGenerator;
pub use responder::NackResponder;
