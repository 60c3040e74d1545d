//! CPU ops for the cores this layer runs on.

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "arm", target_os = "none"))] {
        mod arm;
        pub use arm::CortexM;
    }
}
