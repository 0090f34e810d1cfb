use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = PathBuf::from("../proto");

    // Tell cargo to recompile if any proto files change
    println!("cargo:rerun-if-changed=../proto/sso/auth/v1/");

    // Clients are generated too: integration tests and callers use them
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(
            PathBuf::from(std::env::var("OUT_DIR")?).join("sso_service_descriptor.bin"),
        )
        .compile_protos(&["../proto/sso/auth/v1/auth.proto"], &[proto_root])?;

    Ok(())
}
