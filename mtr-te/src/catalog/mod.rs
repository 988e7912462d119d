//! Band catalog population and the list of offered genres

pub mod registry;
pub mod seeder;

pub use registry::{GenreInfo, GenreRegistry};
pub use seeder::CatalogSeeder;
