pub mod composite;
pub mod compositor;
pub mod context;
pub mod frame;
pub mod queue;
pub mod text;
