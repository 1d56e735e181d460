mod handler;

pub use handler::InputRouter;
