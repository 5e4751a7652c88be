/// Builds the gRPC client and server code for `order_management.proto` using
/// `tonic-prost-build`.
///
/// The generated module also gets an encoded file descriptor set so the server
/// can expose gRPC reflection.
///
/// # Files and Paths
///
/// - Proto file: `proto/order_management.proto`
/// - Includes: `proto/`
/// - Descriptor: `$OUT_DIR/order_management_descriptor.bin`
///
/// # Panics
///
/// Panics if `OUT_DIR` is unset or code generation fails (for example when
/// `protoc` is not installed).
///
/// # Output
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("order_management");
/// }
/// ```
use std::env;
use std::path::PathBuf;
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("order_management_descriptor.bin");

    println!("cargo:rerun-if-changed=proto/order_management.proto");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/order_management.proto"], &["proto"])
        .unwrap();
}
