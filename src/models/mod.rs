mod agent;
mod anomaly;
mod campaign;
mod emergency;
mod mission;
mod note;
mod snapshot;
mod track;

pub use agent::*;
pub use anomaly::*;
pub use campaign::*;
pub use emergency::*;
pub use mission::*;
pub use note::*;
pub use snapshot::*;
pub use track::*;
