pub mod cycles;
pub mod done;
pub mod dot;
pub mod import;
pub mod link;
pub mod next;
pub mod order;
pub mod show;
pub mod stats;
pub mod validate;
