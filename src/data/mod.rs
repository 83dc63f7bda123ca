pub mod assembler;
pub mod input;
pub mod profile;
pub mod row;
pub mod schema;

pub use assembler::{Assembly, Calendar, FeatureAssembler, SchemaGap};
pub use input::RawInput;
pub use profile::AssemblyProfile;
pub use row::FeatureRow;
pub use schema::FeatureSchema;
