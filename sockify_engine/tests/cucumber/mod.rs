
pub use world::LifecycleWorld;
