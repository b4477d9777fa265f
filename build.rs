fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/sourcing.proto");

    // Only the gRPC server and its demo client need generated code
    if std::env::var_os("CARGO_FEATURE_SERVER").is_none() {
        return Ok(());
    }

    tonic_build::compile_protos("proto/sourcing.proto")?;
    Ok(())
}
