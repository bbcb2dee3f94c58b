//! Façade tests: the typed accessors end to end over a scripted link.

mod common;

use common::{recording_sleep_fn, MockLink, ScriptedResponse};
use weomlink_core::camera::{
    Framerate, ImageFlip, Lens, MemoryTarget, PresetId, Range, ShutterUpdateMode, Trigger, Weom,
};
use weomlink_core::error::Error;
use weomlink_core::protocol::TcsiPacket;

/// The identificator read answered on `set_data_link`.
fn identificator() -> ScriptedResponse {
    ScriptedResponse::Ok(vec![0x57, 0x06, 0x4D, 0x01])
}

fn connected_camera(mut script: Vec<ScriptedResponse>) -> (Weom, MockLink) {
    script.insert(0, identificator());
    let link = MockLink::new(script);
    let (sleep_fn, _) = recording_sleep_fn();
    (Weom::with_sleep_fn(sleep_fn), link)
}

#[test]
fn test_set_data_link_verifies_identificator() {
    let (mut camera, link) = connected_camera(vec![]);
    camera.set_data_link(Box::new(link)).unwrap();
}

#[test]
fn test_set_data_link_rejects_foreign_device() {
    let link = MockLink::new(vec![ScriptedResponse::Ok(vec![0x00, 0x11, 0x22, 0x33])]);
    let (sleep_fn, _) = recording_sleep_fn();
    let mut camera = Weom::with_sleep_fn(sleep_fn);
    assert_eq!(camera.set_data_link(Box::new(link)), Err(Error::NoProtocol));
    // The rejected stack is gone again.
    assert_eq!(camera.get_palette_index(), Err(Error::NoDataLink));
}

#[test]
fn test_palette_accessors() {
    let (mut camera, link) = connected_camera(vec![
        ScriptedResponse::Ok(vec![2, 0, 0, 0]),
        ScriptedResponse::OkEmpty,
    ]);
    let state = link.state();
    camera.set_data_link(Box::new(link)).unwrap();

    assert_eq!(camera.get_palette_index().unwrap(), 2);
    camera.set_palette_index(5, MemoryTarget::Ram).unwrap();

    let written = &state.lock().unwrap().written;
    let request = TcsiPacket::from_bytes(written[2].clone());
    assert_eq!(request.address(), 0x0200);
    assert_eq!(request.payload(), &[5, 0, 0, 0]);
}

#[test]
fn test_flash_target_offsets_address() {
    let (mut camera, link) = connected_camera(vec![ScriptedResponse::OkEmpty]);
    let state = link.state();
    camera.set_data_link(Box::new(link)).unwrap();

    camera.set_palette_index(1, MemoryTarget::Flash).unwrap();

    let written = &state.lock().unwrap().written;
    let request = TcsiPacket::from_bytes(written[1].clone());
    assert_eq!(request.address(), 0xD080_0200);
}

#[test]
fn test_framerate_roundtrip() {
    let (mut camera, link) = connected_camera(vec![
        ScriptedResponse::Ok(vec![1, 0, 0, 0]),
        ScriptedResponse::OkEmpty,
    ]);
    camera.set_data_link(Box::new(link)).unwrap();

    assert_eq!(camera.get_framerate().unwrap(), Framerate::Fps30);
    camera.set_framerate(Framerate::Fps60).unwrap();
}

#[test]
fn test_unknown_register_value_is_conversion_error() {
    let (mut camera, link) = connected_camera(vec![ScriptedResponse::Ok(vec![9, 0, 0, 0])]);
    camera.set_data_link(Box::new(link)).unwrap();

    assert_eq!(camera.get_framerate(), Err(Error::InvalidData));
}

#[test]
fn test_image_flip_bits() {
    let (mut camera, link) = connected_camera(vec![
        ScriptedResponse::Ok(vec![0b10, 0, 0, 0]),
        ScriptedResponse::OkEmpty,
    ]);
    let state = link.state();
    camera.set_data_link(Box::new(link)).unwrap();

    let flip = camera.get_image_flip().unwrap();
    assert_eq!(flip, ImageFlip::new(false, true));

    camera.set_image_flip(ImageFlip::new(true, false)).unwrap();
    let written = &state.lock().unwrap().written;
    let request = TcsiPacket::from_bytes(written[2].clone());
    assert_eq!(request.payload(), &[0b01, 0, 0, 0]);
}

#[test]
fn test_serial_number_trims_padding() {
    // The serial number window is 32 bytes, read in 4-byte chunks.
    let mut script = vec![ScriptedResponse::Ok(b"WTC6".to_vec())];
    script.push(ScriptedResponse::Ok(b"40-A".to_vec()));
    script.push(ScriptedResponse::Ok(vec![b'7', 0, 0, 0]));
    script.extend(std::iter::repeat(ScriptedResponse::Ok(vec![0u8; 4])).take(5));

    let (mut camera, link) = connected_camera(script);
    camera.set_data_link(Box::new(link)).unwrap();

    assert_eq!(camera.get_serial_number().unwrap(), "WTC640-A7");
}

#[test]
fn test_preset_id_roundtrip() {
    // Current preset: range HIGH_GAIN (0x0007), lens WTC 7.5 (0x0003),
    // little-endian 16-bit halves.
    let (mut camera, link) = connected_camera(vec![
        ScriptedResponse::Ok(vec![0x07, 0x00, 0x03, 0x00]),
        ScriptedResponse::OkEmpty,
        ScriptedResponse::OkEmpty,
    ]);
    let state = link.state();
    camera.set_data_link(Box::new(link)).unwrap();

    let preset = camera.get_preset_id().unwrap();
    assert_eq!(preset, PresetId::new(Range::HighGain, Lens::Wtc7_5));

    // Selecting a preset writes the id, then fires the switch trigger.
    camera
        .set_preset_id(PresetId::new(Range::R1, Lens::Wtc35))
        .unwrap();

    let written = &state.lock().unwrap().written;
    let select = TcsiPacket::from_bytes(written[2].clone());
    assert_eq!(select.address(), 0x0A14);
    assert_eq!(select.payload(), &[0x00, 0x00, 0x00, 0x00]);

    let trigger = TcsiPacket::from_bytes(written[3].clone());
    assert_eq!(trigger.address(), 0x0004);
    assert_eq!(
        trigger.payload(),
        &(Trigger::SetSelectedPreset as u32).to_le_bytes()
    );
}

#[test]
fn test_persisting_setter_targets_flash() {
    let (mut camera, link) = connected_camera(vec![ScriptedResponse::OkEmpty]);
    let state = link.state();
    camera.set_data_link(Box::new(link)).unwrap();

    camera
        .set_shutter_update_mode(ShutterUpdateMode::Adaptive, MemoryTarget::Flash)
        .unwrap();

    let written = &state.lock().unwrap().written;
    let request = TcsiPacket::from_bytes(written[1].clone());
    assert_eq!(request.address(), 0xD080_0308);
    assert_eq!(request.payload(), &[2, 0, 0, 0]);
}

#[test]
fn test_shutter_adaptive_threshold_fixed_point() {
    // Raw 300 hundredths reads back as 3.0; writing 1.25 stores raw 125.
    let (mut camera, link) = connected_camera(vec![
        ScriptedResponse::Ok(vec![0x2C, 0x01, 0, 0]),
        ScriptedResponse::OkEmpty,
    ]);
    let state = link.state();
    camera.set_data_link(Box::new(link)).unwrap();

    assert_eq!(camera.get_shutter_adaptive_threshold().unwrap(), 3.0);

    camera
        .set_shutter_adaptive_threshold(1.25, MemoryTarget::Ram)
        .unwrap();
    let written = &state.lock().unwrap().written;
    let request = TcsiPacket::from_bytes(written[2].clone());
    assert_eq!(request.address(), 0x0324);
    assert_eq!(request.payload(), &[125, 0, 0, 0]);

    assert_eq!(
        camera.set_shutter_adaptive_threshold(-1.0, MemoryTarget::Ram),
        Err(Error::InvalidData)
    );
}

#[test]
fn test_preset_table_access() {
    let (mut camera, link) = connected_camera(vec![
        ScriptedResponse::Ok(vec![3, 0, 0, 0]),
        ScriptedResponse::Ok(vec![0x01, 0x00, 0x02, 0x00]),
    ]);
    let state = link.state();
    camera.set_data_link(Box::new(link)).unwrap();

    assert_eq!(camera.get_preset_id_count().unwrap(), 3);
    assert_eq!(
        camera.get_preset_id_at(1).unwrap(),
        PresetId::new(Range::R2, Lens::Wtc14)
    );

    let written = &state.lock().unwrap().written;
    let count_request = TcsiPacket::from_bytes(written[1].clone());
    assert_eq!(count_request.address(), 0x0A10);
    // Slot 1 sits one 4-byte entry past the table base.
    let slot_request = TcsiPacket::from_bytes(written[2].clone());
    assert_eq!(slot_request.address(), 0x0A20);
}

#[test]
fn test_save_current_preset_to_flash() {
    let (mut camera, link) = connected_camera(vec![
        ScriptedResponse::Ok(vec![0x07, 0x00, 0x03, 0x00]),
        ScriptedResponse::OkEmpty,
    ]);
    let state = link.state();
    camera.set_data_link(Box::new(link)).unwrap();

    camera.save_current_preset_index_to_flash().unwrap();

    let written = &state.lock().unwrap().written;
    let read_request = TcsiPacket::from_bytes(written[1].clone());
    assert_eq!(read_request.address(), 0x0A18);
    let write_request = TcsiPacket::from_bytes(written[2].clone());
    assert_eq!(write_request.address(), 0xD080_0A14);
    assert_eq!(write_request.payload(), &[0x07, 0x00, 0x03, 0x00]);
}

#[test]
fn test_status_word() {
    let (mut camera, link) = connected_camera(vec![ScriptedResponse::Ok(vec![
        0b0000_0010,
        0,
        0,
        0,
    ])]);
    camera.set_data_link(Box::new(link)).unwrap();

    let status = camera.get_status().unwrap();
    assert!(status.is_camera_not_ready());
    assert!(!status.is_nuc_active());
}
