fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tell Cargo that if the given file changes, to rerun this build script.
    println!("cargo:rerun-if-changed=proto/note/v1/note.proto");

    // Vendored protoc, so neither contributors nor CI need a system install.
    let mut config = prost_build::Config::new();
    config.protoc_executable(protoc_bin_vendored::protoc_bin_path()?);

    let well_known = protoc_bin_vendored::include_path()?;
    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);

    tonic_build::configure()
        .file_descriptor_set_path(out_dir.join("note_descriptor.bin"))
        .build_server(true)
        .build_client(true)
        .compile_protos_with_config(
            config,
            &["proto/note/v1/note.proto"],
            &[std::path::PathBuf::from("proto"), well_known],
        )?;
    Ok(())
}
