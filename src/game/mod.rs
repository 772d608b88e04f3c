pub mod captures;
pub mod position;
pub mod view;
