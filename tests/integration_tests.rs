use image::{ImageBuffer, Rgba};
use lsb_carrier::{
    cli::{HideArgs, InspectArgs, RecoverArgs},
    encode_png,
    handler::{handle_hide, handle_inspect, handle_recover, next_filename},
};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的普通图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 4) as usize];
    StdRng::seed_from_u64(0x5eed).fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(4))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgba([chunk[0], chunk[1], chunk[2], 255]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

fn hide_args(file: &Path, dest: Option<&Path>) -> HideArgs {
    HideArgs {
        file: file.to_path_buf(),
        ext: None,
        dest: dest.map(Path::to_path_buf),
        force: false,
    }
}

fn recover_args(image: &Path, output: Option<&Path>) -> RecoverArgs {
    RecoverArgs {
        image: image.to_path_buf(),
        output: output.map(Path::to_path_buf),
        force: false,
        passthrough: false,
    }
}

/// 验证从隐藏到恢复的完整流程
#[test]
fn test_handle_hide_and_recover_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    let carrier_path = dir.path().join("carrier.png");
    let recovered_path = dir.path().join("recovered.bin");

    let mut original = vec![0u8; 5000];
    StdRng::seed_from_u64(1).fill_bytes(&mut original);
    fs::write(&source_path, &original)?;

    // 2. 测试 handle_hide
    handle_hide(hide_args(&source_path, Some(&carrier_path)))?;
    assert!(carrier_path.exists(), "Carrier image should be created.");

    // 3. 测试 handle_recover
    handle_recover(recover_args(&carrier_path, Some(&recovered_path)))?;
    assert!(
        recovered_path.exists(),
        "Recovered file should be created."
    );

    // 4. 验证结果
    assert_eq!(
        fs::read(&recovered_path)?,
        original,
        "Recovered bytes must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_handle_hide_and_recover_with_defaults() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("notes.txt");
    let original_text = "Testing default path generation. 测试默认路径生成。";
    fs::write(&source_path, original_text)?;

    // 不提供 dest 路径
    handle_hide(hide_args(&source_path, None))?;
    let expected_carrier = dir.path().join("carrier_notes.png");
    assert!(
        expected_carrier.exists(),
        "Default carrier image should be created at: {:?}",
        expected_carrier
    );

    // 不提供输出路径，扩展名来自帧
    handle_recover(recover_args(&expected_carrier, None))?;
    let first = dir.path().join("carrier_notes_001.txt");
    assert_eq!(fs::read_to_string(&first)?, original_text);

    // 再次恢复时编号递增，不会覆盖已有文件
    handle_recover(recover_args(&expected_carrier, None))?;
    let second = dir.path().join("carrier_notes_002.txt");
    assert_eq!(fs::read_to_string(&second)?, original_text);

    Ok(())
}

/// 验证 --ext 覆盖源文件的扩展名，并支持其他无损输出格式
#[test]
fn test_hide_with_explicit_extension_and_bmp_output() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("archive");
    let carrier_path = dir.path().join("carrier.bmp");
    fs::write(&source_path, b"PK\x03\x04 not really a zip")?;

    let mut args = hide_args(&source_path, Some(&carrier_path));
    args.ext = Some(".zip".to_string());
    handle_hide(args)?;

    assert_eq!(image::ImageFormat::from_path(&carrier_path)?, image::ImageFormat::Bmp);
    handle_recover(recover_args(&carrier_path, None))?;
    assert_eq!(
        fs::read(dir.path().join("carrier_001.zip"))?,
        b"PK\x03\x04 not really a zip"
    );

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("payload.txt");
    let dest_path = dir.path().join("dest.png");
    fs::write(&source_path, "some text")?;

    // 先创建一个同名的目标文件，模拟“文件已存在”的场景
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;

    let result = handle_hide(hide_args(&source_path, Some(&dest_path)));
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    let mut forced = hide_args(&source_path, Some(&dest_path));
    forced.force = true;
    handle_hide(forced)?;

    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证普通图像无法恢复，除非指定 --passthrough
#[test]
fn test_recover_plain_image_and_passthrough() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("photo.png");
    create_test_image(&image_path, 100, 100);

    let result = handle_recover(recover_args(&image_path, None));
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Failed to recover a hidden file"));
    }

    let mut args = recover_args(&image_path, None);
    args.passthrough = true;
    handle_recover(args)?;

    let passthrough_path = dir.path().join("photo_001.png");
    assert_eq!(fs::read(&passthrough_path)?, fs::read(&image_path)?);

    Ok(())
}

/// 验证不支持的载体格式会被拒绝
#[test]
fn test_hide_rejects_lossy_destination() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("payload.txt");
    fs::write(&source_path, "lossy formats destroy the low bits")?;

    let result = handle_hide(hide_args(&source_path, Some(&dir.path().join("out.jpg"))));
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Unsupported carrier format"));
    }

    Ok(())
}

/// 验证 inspect 对载体和普通图像都能正常运行
#[test]
fn test_handle_inspect() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("data.json");
    let carrier_path = dir.path().join("carrier.png");
    let plain_path = dir.path().join("plain.png");
    fs::write(&source_path, r#"{"hidden": true}"#)?;
    create_test_image(&plain_path, 32, 32);

    handle_hide(hide_args(&source_path, Some(&carrier_path)))?;
    handle_inspect(InspectArgs {
        image: carrier_path,
    })?;
    handle_inspect(InspectArgs { image: plain_path })?;

    let missing = handle_inspect(InspectArgs {
        image: dir.path().join("missing.png"),
    });
    assert!(missing.is_err());

    Ok(())
}

/// 验证顺序文件名只认三位编号
#[test]
fn test_next_filename_numbering() -> anyhow::Result<()> {
    let dir = tempdir()?;
    assert_eq!(
        next_filename(dir.path(), "result", "mp4")?,
        dir.path().join("result_001.mp4")
    );

    fs::write(dir.path().join("result_001.mp4"), b"")?;
    fs::write(dir.path().join("result_007.mp4"), b"")?;
    fs::write(dir.path().join("result_0099.mp4"), b"")?;
    fs::write(dir.path().join("result_050.png"), b"")?;
    fs::write(dir.path().join("other_080.mp4"), b"")?;

    assert_eq!(
        next_filename(dir.path(), "result", "mp4")?,
        dir.path().join("result_008.mp4")
    );
    assert_eq!(
        next_filename(dir.path(), "result", "")?,
        dir.path().join("result_001")
    );

    Ok(())
}

/// 验证图像中带路径字符的扩展名不会让默认输出逃出图像所在目录
#[test]
fn test_recover_rejects_path_like_extensions() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let inner = dir.path().join("inner");
    fs::create_dir(&inner)?;
    // 让 `img_001.x/../../escaped` 这样的路径可以被解析
    fs::create_dir(inner.join("img_001.x"))?;

    for extension in ["a/b", "x/../../escaped", "..", "nul\0byte"] {
        let image_path = inner.join("img.png");
        fs::write(&image_path, encode_png(b"owned", extension)?)?;

        let result = handle_recover(recover_args(&image_path, None));
        assert!(result.is_err(), "extension {extension:?} should be refused");
        if let Err(e) = result {
            assert!(e.to_string().contains("Refusing unsafe file extension"));
        }
    }
    assert!(!dir.path().join("escaped").exists());
    assert!(!inner.join("escaped").exists());

    // 显式指定输出路径时仍然可以恢复
    let image_path = inner.join("img.png");
    let output = inner.join("explicit.bin");
    handle_recover(recover_args(&image_path, Some(&output)))?;
    assert_eq!(fs::read(&output)?, b"owned");

    assert!(next_filename(dir.path(), "result", "a/b").is_err());
    assert_eq!(
        next_filename(dir.path(), "result", "tar.gz")?,
        dir.path().join("result_001.tar.gz")
    );

    Ok(())
}
