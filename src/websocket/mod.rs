mod channel;

pub use channel::GameChannel;
