use super::*;

#[test]
fn mix_at_adds_instead_of_overwriting() {
    let mut out = AudioBuffer::from_interleaved(vec![0.25; 8]).unwrap();
    let src = AudioBuffer::from_interleaved(vec![0.5; 4]).unwrap();
    assert_eq!(mix_at(&mut out, 1, &src), 2);
    assert_eq!(out.frame(0), Some((0.25, 0.25)));
    assert_eq!(out.frame(1), Some((0.75, 0.75)));
    assert_eq!(out.frame(2), Some((0.75, 0.75)));
    assert_eq!(out.frame(3), Some((0.25, 0.25)));
}

#[test]
fn mix_at_drops_samples_past_the_end() {
    let mut out = AudioBuffer::silence(2).unwrap();
    let src = AudioBuffer::from_interleaved(vec![1.0; 8]).unwrap();
    assert_eq!(mix_at(&mut out, 1, &src), 1);
    assert_eq!(out.frame(1), Some((1.0, 1.0)));
    assert_eq!(mix_at(&mut out, 5, &src), 0);
}

#[test]
fn f32le_export_clamps_and_writes_le_bytes() {
    let dir = std::env::temp_dir().join(format!("strata-mix-{}", std::process::id()));
    let path = dir.join("out.f32le");
    let audio = AudioBuffer::from_interleaved(vec![2.0, -0.5]).unwrap();
    write_f32le_file(&audio, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes(bytes[0..4].try_into().unwrap()), 1.0);
    assert_eq!(f32::from_le_bytes(bytes[4..8].try_into().unwrap()), -0.5);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn f32le_files_read_back_as_stereo_buffers() {
    let dir = std::env::temp_dir().join(format!("strata-mix-read-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("in.f32le");
    let src = AudioBuffer::from_interleaved(vec![0.5, -0.5, 0.25, -0.25]).unwrap();
    write_f32le_file(&src, &path).unwrap();
    assert_eq!(read_f32le_file(&path).unwrap(), src);

    let odd = dir.join("odd.f32le");
    std::fs::write(&odd, 0.5f32.to_le_bytes()).unwrap();
    assert!(matches!(
        read_f32le_file(&odd),
        Err(StrataError::InvalidArgument(_))
    ));
    assert!(read_f32le_file(&dir.join("missing.f32le")).is_err());
    let _ = std::fs::remove_dir_all(dir);
}
