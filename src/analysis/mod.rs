mod load;
mod model;

pub use load::load_analysis_set;
pub use model::{AnalysisSet, StockResult};
