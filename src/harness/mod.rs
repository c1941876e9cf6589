pub mod config;
pub mod report;
pub mod spawner;

#[cfg(test)]
pub mod tests;
