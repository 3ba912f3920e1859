use image::{ImageBuffer, Rgb, Rgba};
use lsb_hide::{
    StegoError,
    cli::{CapacityArgs, ConvertArgs, HideArgs, RecoverArgs},
    handler::{handle_capacity, handle_convert, handle_hide, handle_recover},
};
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的 24 位 BMP 测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(3))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgb([chunk[0], chunk[1], chunk[2]]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

/// 验证从隐藏到恢复的完整流程，包括扩展名的保存
#[test]
fn test_handle_hide_and_recover_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.bmp");
    let hidden_image_path = dir.path().join("hidden.bmp");
    let source_path = dir.path().join("source.txt");
    let recovered_path = dir.path().join("recovered.txt");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&source_path, original_text)?;

    // 2. 测试 handle_hide
    handle_hide(HideArgs {
        image: original_image_path.clone(),
        secret: source_path.clone(),
        magic: "hunter2".to_owned(),
        dest: Some(hidden_image_path.clone()),
        force: false,
    })?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );

    // 3. 测试 handle_recover
    handle_recover(RecoverArgs {
        image: hidden_image_path.clone(),
        magic: "hunter2".to_owned(),
        output: Some(recovered_path.clone()),
        force: false,
    })?;

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&recovered_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text must match the original."
    );

    // 5. 载体只在最低位上发生变化
    let original = fs::read(&original_image_path)?;
    let hidden = fs::read(&hidden_image_path)?;
    assert_eq!(original.len(), hidden.len());
    assert!(original.iter().zip(&hidden).all(|(a, b)| (a ^ b) & 0xFE == 0));

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并恢复原扩展名
#[test]
fn test_handle_hide_and_recover_with_defaults() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.bmp");
    let source_path = dir.path().join("notes.md");

    create_test_image(&original_image_path, 80, 60);
    let original_bytes: Vec<u8> = (0..=255u8).cycle().take(700).collect();
    fs::write(&source_path, &original_bytes)?;

    handle_hide(HideArgs {
        image: original_image_path.clone(),
        secret: source_path.clone(),
        magic: "magic".to_owned(),
        dest: None,
        force: false,
    })?;

    let expected_hidden_path = dir.path().join("stego_original.bmp");
    assert!(
        expected_hidden_path.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden_path
    );

    handle_recover(RecoverArgs {
        image: expected_hidden_path,
        magic: "magic".to_owned(),
        output: None,
        force: false,
    })?;

    let expected_recovered_path = dir.path().join("recovered_stego_original.md");
    assert!(
        expected_recovered_path.exists(),
        "Default recovered file should be created at: {:?}",
        expected_recovered_path
    );
    assert_eq!(fs::read(&expected_recovered_path)?, original_bytes);

    Ok(())
}

/// 验证错误的魔术字符串无法恢复数据，且不会生成输出文件
#[test]
fn test_wrong_magic_string_is_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.bmp");
    let secret_path = dir.path().join("secret.bin");
    let dest_path = dir.path().join("dest.bmp");
    let output_path = dir.path().join("out.bin");

    create_test_image(&image_path, 100, 100);
    fs::write(&secret_path, b"0123456789")?;

    handle_hide(HideArgs {
        image: image_path,
        secret: secret_path,
        magic: "hunter2".to_owned(),
        dest: Some(dest_path.clone()),
        force: false,
    })?;

    let result = handle_recover(RecoverArgs {
        image: dest_path,
        magic: "hunter3".to_owned(),
        output: Some(output_path.clone()),
        force: false,
    });

    let err = result.expect_err("Recovery with the wrong magic string must fail.");
    assert_eq!(
        err.root_cause().downcast_ref::<StegoError>(),
        Some(&StegoError::Authentication)
    );
    assert!(!output_path.exists());

    Ok(())
}

/// 验证未经隐写的图像会被报告为没有隐藏数据
#[test]
fn test_recover_from_clean_image() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("clean.bmp");
    create_test_image(&image_path, 50, 50);

    let result = handle_recover(RecoverArgs {
        image: image_path,
        magic: "whatever".to_owned(),
        output: None,
        force: false,
    });

    let err = result.expect_err("A clean image carries no hidden data.");
    assert_eq!(err.root_cause().to_string(), "no hidden data detected");

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.bmp");
    let secret_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&image_path, 50, 50);
    fs::write(&secret_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;

    let result = handle_hide(HideArgs {
        image: image_path.clone(),
        secret: secret_path.clone(),
        magic: "pw".to_owned(),
        dest: Some(dest_path.clone()),
        force: false,
    });
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let result = handle_hide(HideArgs {
        image: image_path,
        secret: secret_path,
        magic: "pw".to_owned(),
        dest: Some(dest_path.clone()),
        force: true,
    });
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("small.bmp");
    let secret_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&image_path, 10, 10);
    fs::write(&secret_path, "a".repeat(5000))?;

    let result = handle_hide(HideArgs {
        image: image_path,
        secret: secret_path,
        magic: "pw".to_owned(),
        dest: Some(dest_path.clone()),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Not enough space"));
    }
    assert!(!dest_path.exists());

    Ok(())
}

/// 验证非 BMP 载体被拒绝，而转换后的 BMP 可以正常使用
#[test]
fn test_png_carrier_requires_conversion() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let png_path = dir.path().join("photo.png");
    let secret_path = dir.path().join("secret.txt");

    let mut img_buf = ImageBuffer::new(64, 64);
    img_buf
        .enumerate_pixels_mut()
        .for_each(|(x, y, pixel)| *pixel = Rgba([x as u8 * 3, y as u8 * 2, 77, 200]));
    img_buf.save(&png_path)?;
    fs::write(&secret_path, "hidden in a converted png")?;

    let result = handle_hide(HideArgs {
        image: png_path.clone(),
        secret: secret_path.clone(),
        magic: "pw".to_owned(),
        dest: None,
        force: false,
    });
    let err = result.expect_err("PNG carriers are not accepted directly.");
    assert_eq!(err.root_cause().to_string(), "unsupported bitmap variant");

    handle_convert(ConvertArgs {
        input: png_path,
        output: None,
        force: false,
    })?;
    let bmp_path = dir.path().join("photo.bmp");
    assert!(bmp_path.exists());

    handle_capacity(CapacityArgs {
        image: bmp_path.clone(),
    })?;

    handle_hide(HideArgs {
        image: bmp_path.clone(),
        secret: secret_path,
        magic: "pw".to_owned(),
        dest: None,
        force: false,
    })?;
    let stego_path = dir.path().join("stego_photo.bmp");
    handle_capacity(CapacityArgs {
        image: stego_path.clone(),
    })?;

    let output_path = dir.path().join("out.txt");
    handle_recover(RecoverArgs {
        image: stego_path,
        magic: "pw".to_owned(),
        output: Some(output_path.clone()),
        force: false,
    })?;
    assert_eq!(
        fs::read_to_string(output_path)?,
        "hidden in a converted png"
    );

    Ok(())
}

/// 验证边界版接口在缓冲区层面满足往返与密码敏感性
#[test]
fn test_report_roundtrip_on_generated_bitmap() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("carrier.bmp");
    create_test_image(&image_path, 100, 100);
    let carrier = fs::read(&image_path)?;

    let encoded = lsb_hide::report::encode(&carrier, b"0123456789", "txt", "hunter2");
    assert!(encoded.success, "{}", encoded.message);
    let stego = encoded.output_bytes.expect("encoded bytes");

    let decoded = lsb_hide::report::decode(&stego, "hunter2");
    assert!(decoded.success);
    assert_eq!(decoded.payload_bytes.as_deref(), Some(&b"0123456789"[..]));
    assert_eq!(decoded.payload_extension.as_deref(), Some("txt"));

    let wrong = lsb_hide::report::decode(&stego, "hunter3");
    assert!(!wrong.success);
    assert_eq!(wrong.message, "wrong password or corrupted image");

    Ok(())
}

/// 验证旧嵌入头损坏的图像仍然可以重新隐写
#[test]
fn test_hide_over_damaged_previous_embedding() -> anyhow::Result<()> {
    use lsb_hide::bitmap::BitmapImage;
    use lsb_hide::constants::{HEADER_BITS, HEADER_BYTES};
    use lsb_hide::frame::{from_bits, to_bits};
    use lsb_hide::steganography::{embed, extract, header_positions};

    let dir = tempdir()?;
    let image_path = dir.path().join("reused.bmp");
    let secret_path = dir.path().join("fresh.txt");
    let dest_path = dir.path().join("rehidden.bmp");
    let output_path = dir.path().join("fresh_out.txt");

    create_test_image(&image_path, 60, 60);
    let carrier = fs::read(&image_path)?;

    // 先隐写一次，再破坏扩展名字段，只保留完好的标识
    let stego = lsb_hide::encode(&carrier, b"old data", "txt", "old")?;
    let mut image = BitmapImage::parse(&stego)?;
    let mut header = [0u8; HEADER_BYTES];
    header.copy_from_slice(&from_bits(&extract(
        &image,
        &header_positions(),
        HEADER_BITS,
    )?));
    header[16..32].fill(b'z');
    embed(&mut image, &header_positions(), &to_bits(&header))?;
    fs::write(&image_path, image.to_bytes())?;

    assert!(matches!(
        lsb_hide::codec::inspect(&fs::read(&image_path)?),
        Err(StegoError::CorruptedData(_))
    ));

    fs::write(&secret_path, "fresh secret")?;
    handle_hide(HideArgs {
        image: image_path,
        secret: secret_path,
        magic: "new".to_owned(),
        dest: Some(dest_path.clone()),
        force: false,
    })?;

    handle_recover(RecoverArgs {
        image: dest_path,
        magic: "new".to_owned(),
        output: Some(output_path.clone()),
        force: false,
    })?;
    assert_eq!(fs::read_to_string(output_path)?, "fresh secret");

    Ok(())
}
