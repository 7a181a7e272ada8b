mod config_pof;

pub use config_pof::ConfigPof;
