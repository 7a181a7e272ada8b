macro_rules! env_or_none {
    ($name:ident, $env:literal) => {
        pub const $name: &str = match option_env!($env) {
            Some(val) => val,
            None => "<none>",
        };
    };
}

pub const PACKAGE: &str = "sensorcfg";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
env_or_none!(COMMIT_HASH, "SENSORCFG_GIT_SHA");
env_or_none!(BUILD_TIMESTAMP, "SENSORCFG_BUILD_TIMESTAMP");
