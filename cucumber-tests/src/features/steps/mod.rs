pub mod loader_steps;
pub mod render_steps;
pub mod site_steps;
