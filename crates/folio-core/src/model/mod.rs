mod project;
mod scene;
mod seed;
#[cfg(test)]
mod tests;

pub use project::*;
pub use scene::*;
pub use seed::*;
