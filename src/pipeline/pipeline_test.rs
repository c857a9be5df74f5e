// Integration test for encode -> pack -> unpack through the on-disk layout

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::model::{FRAME_HEIGHT, FRAME_WIDTH, Frame, MANIFEST_FILE, Manifest};
    use crate::pipeline::address::FrameAddress;
    use crate::pipeline::batch::{Stage, run_batch};
    use crate::pipeline::packer::{read_packed_frame, unpack_frame};
    use crate::pipeline::text_frames::{frame_file_path, read_frame_text, write_frame_text};
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame as ImageFrame, Rgb, RgbImage, Rgba, RgbaImage};
    use std::path::Path;
    use tempfile::tempdir;

    fn test_config(root: &Path) -> Config {
        Config {
            input_dir: root.join("INPUT"),
            text_dir: root.join("TXT"),
            output_dir: root.to_path_buf(),
            ..Config::default()
        }
    }

    fn write_gif(path: &Path, colors: &[[u8; 4]]) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        let frames = colors.iter().map(|c| {
            ImageFrame::from_parts(
                RgbaImage::from_pixel(40, 30, Rgba(*c)),
                0,
                0,
                Delay::from_numer_denom_ms(50, 1),
            )
        });
        encoder.encode_frames(frames).unwrap();
    }

    #[test]
    fn test_full_run_stills_and_gif() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();

        let mut photo = RgbImage::new(400, 300);
        for (x, y, px) in photo.enumerate_pixels_mut() {
            *px = Rgb([(x % 256) as u8, (y % 256) as u8, 90]);
        }
        photo.save(config.input_dir.join("photo.png")).unwrap();
        write_gif(
            &config.input_dir.join("anim.gif"),
            &[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]],
        );
        std::fs::write(config.input_dir.join("readme.md"), "ignored").unwrap();

        let summary = run_batch(&config, Stage::All, |_| {}).unwrap();
        assert_eq!(summary.sources_encoded, 2);
        assert_eq!(summary.sources_failed, 0);
        // Sorted by name: anim.gif before photo.png
        assert_eq!(summary.frame_counts, vec![3, 1]);

        let animations = config.animations_dir();
        let manifest = Manifest::load(&animations.join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.counts, vec![3, 1]);

        // Every packed frame decodes back to its text frame exactly
        for (number, name, frames) in [(0, "anim.gif", 3), (1, "photo.png", 1)] {
            for index in 0..frames {
                let address = FrameAddress::for_index(index).unwrap();
                let bin = animations
                    .join(format!("A{}", number))
                    .join(address.file_path());
                assert_eq!(std::fs::metadata(&bin).unwrap().len(), 22320);

                let text = frame_file_path(&config.text_dir.join(name), index);
                let expected = read_frame_text(&text, FRAME_WIDTH, FRAME_HEIGHT).unwrap();
                assert_eq!(read_packed_frame(&bin).unwrap(), expected);
            }
        }

        assert!(config.sample_images_dir().join("photo.png.jpg").exists());
        assert!(config.sample_animation_dir().join("anim.gif.gif").exists());
    }

    #[test]
    fn test_pack_stage_stops_at_gap() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path());

        let anim = config.text_dir.join("clip.mp4");
        for index in [0, 1, 2, 3, 5] {
            let frame = Frame::filled(FRAME_WIDTH, FRAME_HEIGHT, (index as u8, 1, 2));
            write_frame_text(&frame, &frame_file_path(&anim, index)).unwrap();
        }

        let mut logs = Vec::new();
        let summary = run_batch(&config, Stage::Pack, |m| logs.push(m)).unwrap();
        assert_eq!(summary.frame_counts, vec![4]);

        let base = config.animations_dir().join("A0/TTH0/TH0/H0/T0");
        let bins = std::fs::read_dir(&base).unwrap().count();
        assert_eq!(bins, 4);
        assert!(!base.join("F5.bin").exists());

        let third = std::fs::read(base.join("F3.bin")).unwrap();
        let frame = unpack_frame(&third, FRAME_WIDTH, FRAME_HEIGHT).unwrap();
        assert!(frame.pixels().all(|px| px == (3, 1, 2)));
    }

    #[test]
    fn test_rerun_replaces_previous_output() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        RgbImage::from_pixel(200, 100, Rgb([10, 20, 30]))
            .save(config.input_dir.join("one.png"))
            .unwrap();

        run_batch(&config, Stage::All, |_| {}).unwrap();
        std::fs::remove_file(config.input_dir.join("one.png")).unwrap();
        RgbImage::from_pixel(200, 100, Rgb([10, 20, 30]))
            .save(config.input_dir.join("two.png"))
            .unwrap();

        let summary = run_batch(&config, Stage::All, |_| {}).unwrap();
        assert_eq!(summary.frame_counts, vec![1]);
        assert!(!config.text_dir.join("one.png").exists());
        assert_eq!(
            std::fs::read_to_string(config.animations_dir().join(MANIFEST_FILE)).unwrap(),
            "1\n"
        );
    }

    /// Stand-in for ffmpeg that emits one valid frame and one corrupt one.
    #[cfg(unix)]
    fn write_fake_ffmpeg(dir: &Path, good_frame: &Path) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-ffmpeg");
        let body = format!(
            "#!/bin/sh\nfor arg; do out=\"$arg\"; done\ndir=$(dirname \"$out\")\ncp '{}' \"$dir/frame_000001.png\"\nprintf garbage > \"$dir/frame_000002.png\"\n",
            good_frame.display()
        );
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn test_video_failing_midway_is_not_packed() {
        let temp_dir = tempdir().unwrap();
        let tools = temp_dir.path().join("tools");
        std::fs::create_dir_all(&tools).unwrap();
        let good_frame = tools.join("good.png");
        RgbImage::from_pixel(320, 160, Rgb([40, 40, 40]))
            .save(&good_frame)
            .unwrap();

        let config = Config {
            ffmpeg: write_fake_ffmpeg(&tools, &good_frame)
                .to_string_lossy()
                .into_owned(),
            ..test_config(temp_dir.path())
        };
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::write(config.input_dir.join("clip.mp4"), b"not really a video").unwrap();
        RgbImage::from_pixel(200, 100, Rgb([1, 2, 3]))
            .save(config.input_dir.join("photo.png"))
            .unwrap();

        let mut messages = Vec::new();
        let summary = run_batch(&config, Stage::All, |m| messages.push(m)).unwrap();

        assert_eq!(summary.sources_encoded, 1);
        assert_eq!(summary.sources_failed, 1);
        assert_eq!(summary.frame_counts, vec![1]);
        assert!(messages.iter().any(
            |m| matches!(m, crate::event::AppMsg::ErrorOccurred(e) if e.contains("clip.mp4"))
        ));

        assert!(!config.text_dir.join("clip.mp4").exists());
        assert!(!config.sample_animation_dir().join("clip.mp4.gif").exists());
        let animations = config.animations_dir();
        assert_eq!(
            std::fs::read_to_string(animations.join(MANIFEST_FILE)).unwrap(),
            "1\n"
        );
        assert!(!animations.join("A1").exists());
    }

    #[test]
    fn test_wide_still_keeps_full_width_band() {
        let temp_dir = tempdir().unwrap();
        let config = Config {
            color_correction: false,
            ..test_config(temp_dir.path())
        };
        std::fs::create_dir_all(&config.input_dir).unwrap();
        RgbImage::from_pixel(400, 100, Rgb([255, 255, 255]))
            .save(config.input_dir.join("banner.png"))
            .unwrap();

        run_batch(&config, Stage::All, |_| {}).unwrap();

        let bin = config
            .animations_dir()
            .join("A0")
            .join(FrameAddress::for_index(0).unwrap().file_path());
        let frame = read_packed_frame(&bin).unwrap();
        assert_eq!(frame.get(0, 0), (0, 0, 0));
        assert_eq!(frame.get(0, FRAME_HEIGHT - 1), (0, 0, 0));
        assert_eq!(frame.get(FRAME_WIDTH / 2, FRAME_HEIGHT / 2), (255, 255, 255));
    }
}
