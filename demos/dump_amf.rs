//! Encode a sample object graph and print it as hex
//!
//! Run with: cargo run --example dump_amf
//!
//! Set RUST_LOG=amf_serializer=trace to see session tracing.

use amf_serializer::{
    AmfValue, AmfVersion, ClassMapping, Serializer, SerializerConfig, TypedObject,
};

fn hex(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .map(|line| {
            line.iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = SerializerConfig::new().max_depth(16);
    let serializer = Serializer::with_mapper(config, ClassMapping::new());

    let tags = AmfValue::from(vec!["live", "live", "hd"]);
    let stream = AmfValue::object(
        TypedObject::dynamic("com.example.Stream")
            .member("name", "test_key")
            .member("bitrate", 4500)
            .member("tags", tags.clone())
            .dynamic_member("aliases", tags),
    );
    let value = AmfValue::array(vec![
        stream.clone(),
        stream,
        AmfValue::Date(1_700_000_000_000.0),
    ]);

    for version in [AmfVersion::Amf0, AmfVersion::Amf3] {
        let bytes = serializer.serialize(version, &value)?;
        println!("{} ({} bytes):\n{}\n", version, bytes.len(), hex(&bytes));
    }

    Ok(())
}
