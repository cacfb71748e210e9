/// Check that `$obj` survives a round trip through the canonical (compressed and uncompressed),
/// JSON and MessagePack encodings. The caller must have `CanonicalSerialize` and
/// `CanonicalDeserialize` in scope and depend on `serde_json` and `rmp_serde`.
#[macro_export]
macro_rules! test_serialization {
    ($obj_type:ty, $obj: expr) => {
        let obj = &$obj;

        let mut bytes = vec![];
        CanonicalSerialize::serialize_compressed(obj, &mut bytes).unwrap();
        assert_eq!(bytes.len(), CanonicalSerialize::compressed_size(obj));
        let decoded: $obj_type = CanonicalDeserialize::deserialize_compressed(&bytes[..]).unwrap();
        assert_eq!(&decoded, obj);

        let mut bytes = vec![];
        CanonicalSerialize::serialize_uncompressed(obj, &mut bytes).unwrap();
        let decoded: $obj_type =
            CanonicalDeserialize::deserialize_uncompressed(&bytes[..]).unwrap();
        assert_eq!(&decoded, obj);

        let json = serde_json::to_string(obj).unwrap();
        let decoded = serde_json::from_str::<$obj_type>(&json).unwrap();
        assert_eq!(&decoded, obj);

        let packed = rmp_serde::to_vec_named(obj).unwrap();
        let decoded = rmp_serde::from_slice::<$obj_type>(&packed).unwrap();
        assert_eq!(&decoded, obj);
    };
}
