use super::test_sweep;
use crate::write_blocks::SIZEOF_FILE_OFFSET;
use crate::{write_sweep, write_sweep_file};
use rayvol_core::enums::BinaryFormat;

#[test]
fn sweep_survives_write_and_read() {
    let dir = tempfile::tempdir().expect("Couldn't get tempfile.");
    let path = dir.path().join("swp.test");

    let mut swp = test_sweep(7, 11);
    write_sweep_file(&mut swp, Some(&path)).unwrap();
    let back = rayvol_in::open_sweep(&path).unwrap();

    assert_eq!(back.comm, swp.comm);
    assert_eq!(back.sswb, swp.sswb);
    assert_eq!(back.vold, swp.vold);
    assert_eq!(back.sensor.radd, swp.sensor.radd);
    assert_eq!(back.sensor.parms, swp.sensor.parms);
    assert_eq!(back.sensor.cfac, swp.sensor.cfac);
    assert_eq!(back.sensor.cell_geometry, swp.sensor.cell_geometry);
    assert_eq!(back.swib, swp.swib);
    assert_eq!(back.ray_hdrs, swp.ray_hdrs);

    // Data comes back within the quantisation of 16-bit storage.
    let tol = 0.5 / swp.sensor.parms[0].parameter_scale;
    let orig = swp.parm_data("DBZ").unwrap();
    let read = back.parm_data("DBZ").unwrap();
    assert_eq!(orig.len(), read.len());
    for (a, b) in orig.iter().zip(read.iter()) {
        if a.is_nan() {
            assert!(b.is_nan());
        } else {
            assert!((a - b).abs() <= tol, "{} vs {}", a, b);
        }
    }
}

#[test]
fn sswb_carries_the_file_size() {
    let dir = tempfile::tempdir().expect("Couldn't get tempfile.");
    let path = dir.path().join("swp.size");

    let mut swp = test_sweep(10, 100);
    write_sweep_file(&mut swp, Some(&path)).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let off = SIZEOF_FILE_OFFSET as usize;
    let stored = i32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]]);
    assert_eq!(stored as usize, bytes.len());
    assert_eq!(swp.sswb.sizeof_file as usize, bytes.len());

    // The reader agrees with the patched size.
    let back = rayvol_in::open_sweep(&path).unwrap();
    assert_eq!(back.sswb.sizeof_file as usize, bytes.len());
}

#[test]
fn only_16_bit_output_is_supported() {
    let mut swp = test_sweep(2, 4);
    swp.sensor.parms[0].binary_format = BinaryFormat::Float32;
    let mut out = std::io::Cursor::new(Vec::new());
    let err = write_sweep(&mut swp, &mut out).unwrap_err();
    assert!(matches!(err, rayvol_core::Error::UnsupportedBinaryFormat { .. }));
}

#[test]
fn default_file_names_are_conventional() {
    let dir = tempfile::tempdir().expect("Couldn't get tempfile.");
    let mut swp = test_sweep(2, 4);
    let name = swp.default_file_name();
    assert!(name.starts_with("swp."));
    assert!(name.ends_with("_PPI_v1"));
    let path = dir.path().join(&name);
    let written = write_sweep_file(&mut swp, Some(&path)).unwrap();
    assert!(written.exists());
    // Writing over an existing sweep file is refused.
    assert!(write_sweep_file(&mut swp, Some(&path)).is_err());
}
