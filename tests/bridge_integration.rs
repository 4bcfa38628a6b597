//! End-to-end bridge tests over the mock transport.

use parking_lot::Mutex;
use setu_io::bridge::CameraBridge;
use setu_io::calibration::Intrinsics;
use setu_io::config::BridgeConfig;
use setu_io::error::Error;
use setu_io::mesh::{
    MeshSource, MockDeviceBuffer, Point3D, StaticMeshSource, Triangle, TriangleMesh,
    TriangleStore,
};
use setu_io::messages::{self, CameraInfoMessage, ImageMessage, PointCloudMessage};
use setu_io::transport::{MockTransport, Transport};
use setu_io::Modality;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

fn camera_info_payload(fx: f64, width: u32, height: u32) -> Vec<u8> {
    let msg = CameraInfoMessage {
        width,
        height,
        k: [fx, 0.0, 319.5, 0.0, fx, 239.5, 0.0, 0.0, 1.0],
    };
    messages::encode(&msg).unwrap()
}

fn color_payload(width: u32, height: u32, value: u8) -> Vec<u8> {
    let msg = ImageMessage {
        width,
        height,
        data: vec![value; (width * height * 3) as usize],
    };
    messages::encode(&msg).unwrap()
}

fn depth_payload(width: u32, height: u32, value: u16) -> Vec<u8> {
    let [lo, hi] = value.to_le_bytes();
    let msg = ImageMessage {
        width,
        height,
        data: [lo, hi].repeat((width * height) as usize),
    };
    messages::encode(&msg).unwrap()
}

fn two_triangles() -> Vec<Triangle> {
    vec![
        Triangle {
            p0: Point3D::new(0.0, 0.0, 0.0),
            p1: Point3D::new(1.0, 0.0, 0.0),
            p2: Point3D::new(0.0, 1.0, 0.0),
        },
        Triangle {
            p0: Point3D::new(5.0, 5.0, 5.0),
            p1: Point3D::new(6.0, 5.0, 5.0),
            p2: Point3D::new(5.0, 6.0, 5.0),
        },
    ]
}

fn bridge_with_source(
    source: Arc<Mutex<dyn MeshSource>>,
) -> (CameraBridge, MockTransport) {
    let hub = MockTransport::new();
    let transport: Arc<dyn Transport> = Arc::new(hub.clone());
    let bridge = CameraBridge::new(BridgeConfig::default(), transport, source).unwrap();
    (bridge, hub)
}

fn empty_source() -> Arc<Mutex<dyn MeshSource>> {
    Arc::new(Mutex::new(StaticMeshSource::empty()))
}

#[test]
fn calibration_completes_once_both_infos_arrive() {
    let (bridge, hub) = bridge_with_source(empty_source());
    assert!(!bridge.has_calibration());

    hub.inject("/camera/rgb/camera_info", &camera_info_payload(525.0, 640, 480));
    hub.inject("/camera/depth/camera_info", &camera_info_payload(570.0, 640, 480));

    let cancel = AtomicBool::new(false);
    bridge
        .wait_for_calibration(Duration::from_secs(2), &cancel)
        .unwrap();

    assert!(bridge.has_calibration());
    let color: Intrinsics = bridge.intrinsics(Modality::Color).unwrap();
    assert_eq!(color.fx, 525.0);
    assert_eq!(bridge.intrinsics(Modality::Depth).unwrap().fx, 570.0);
    assert_eq!(bridge.resolution(Modality::Depth).unwrap().width, 640);
    assert_eq!(bridge.depth_scale().scale, 0.001);
}

#[test]
fn calibration_wait_times_out_without_messages() {
    let (bridge, _hub) = bridge_with_source(empty_source());
    let cancel = AtomicBool::new(false);

    let result = bridge.wait_for_calibration(Duration::from_millis(250), &cancel);
    assert!(matches!(result, Err(Error::InitializationTimeout(_))));
}

#[test]
fn calibration_wait_honors_cancellation() {
    let (bridge, _hub) = bridge_with_source(empty_source());
    let cancel = AtomicBool::new(true);

    let result = bridge.wait_for_calibration(Duration::from_secs(10), &cancel);
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn pair_is_delivered_only_when_both_streams_refresh() {
    let (bridge, hub) = bridge_with_source(empty_source());

    // Nothing delivered yet.
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));

    // Color alone is not enough.
    hub.inject("/camera/rgb/image_raw", &color_payload(2, 2, 9));
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));

    // Depth arrives; the failed poll services the transport, the next
    // poll takes the pair.
    hub.inject("/camera/depth/image_raw", &depth_payload(2, 2, 1500));
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));

    let (color, depth) = bridge.try_take_pair().unwrap();
    assert_eq!(color.width, 2);
    assert!(color.pixels.iter().all(|p| p.r == 9 && p.g == 9 && p.b == 9 && p.a == 255));
    assert_eq!(depth.samples, vec![1500; 4]);

    // Slots cleared: back to NotReady until both refresh.
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));
    assert_eq!(bridge.stats().pairs_delivered, 1);
}

#[test]
fn unconsumed_frames_win_over_later_arrivals() {
    let (bridge, hub) = bridge_with_source(empty_source());

    hub.inject("/camera/rgb/image_raw", &color_payload(2, 2, 1));
    hub.inject("/camera/rgb/image_raw", &color_payload(2, 2, 2));
    hub.inject("/camera/depth/image_raw", &depth_payload(2, 2, 1));

    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));
    let (color, _) = bridge.try_take_pair().unwrap();

    assert_eq!(color.pixels[0].r, 1, "slot must keep the unconsumed frame");
    assert_eq!(bridge.stats().color_drops, 1);
}

#[test]
fn resolution_change_mid_stream_is_rejected() {
    let (bridge, hub) = bridge_with_source(empty_source());

    hub.inject("/camera/rgb/image_raw", &color_payload(2, 2, 1));
    hub.inject("/camera/depth/image_raw", &depth_payload(2, 2, 1));
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));
    bridge.try_take_pair().unwrap();

    // The sensor changes resolution mid-stream.
    hub.inject("/camera/depth/image_raw", &depth_payload(4, 4, 2));
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));

    assert_eq!(bridge.stats().resolution_rejects, 1);
    // A frame at the established size is still accepted.
    hub.inject("/camera/depth/image_raw", &depth_payload(2, 2, 3));
    hub.inject("/camera/rgb/image_raw", &color_payload(2, 2, 3));
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));
    let (_, depth) = bridge.try_take_pair().unwrap();
    assert_eq!(depth.samples[0], 3);
}

#[test]
fn malformed_image_payload_is_discarded() {
    let (bridge, hub) = bridge_with_source(empty_source());

    hub.inject("/camera/rgb/image_raw", b"not messagepack at all");
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));
    assert_eq!(bridge.stats().pairs_delivered, 0);
}

#[test]
fn export_request_publishes_flattened_cloud() {
    let device = Arc::new(MockDeviceBuffer::new(two_triangles()));
    let mesh = TriangleMesh::new(TriangleStore::Device(Box::new(Arc::clone(&device))), 2);
    let source: Arc<Mutex<dyn MeshSource>> = Arc::new(Mutex::new(StaticMeshSource::new(mesh)));
    let (_bridge, hub) = bridge_with_source(source);

    hub.request("publish_scene", b"").unwrap();

    let published = hub.published("/complete_cloud");
    assert_eq!(published.len(), 1);

    let msg: PointCloudMessage = messages::decode(&published[0]).unwrap();
    assert_eq!(msg.frame_id, "/world");
    assert!(!msg.is_dense);
    assert_eq!(msg.points.len(), 6);

    let tris = two_triangles();
    assert_eq!(msg.points[0], tris[0].p0);
    assert_eq!(msg.points[1], tris[0].p1);
    assert_eq!(msg.points[2], tris[0].p2);
    assert_eq!(msg.points[3], tris[1].p0);
    assert_eq!(msg.points[5], tris[1].p2);

    // The device-side buffer was copied once and never mutated.
    assert_eq!(device.read_count(), 1);
    assert_eq!(device.contents(), two_triangles().as_slice());
}

#[test]
fn direct_export_returns_the_cloud() {
    let mesh = TriangleMesh::from_triangles(two_triangles());
    let source: Arc<Mutex<dyn MeshSource>> = Arc::new(Mutex::new(StaticMeshSource::new(mesh)));
    let (bridge, hub) = bridge_with_source(source);

    let cloud = bridge.request_export().unwrap();
    assert_eq!(cloud.len(), 6);
    assert_eq!(hub.published("/complete_cloud").len(), 1);
}

#[test]
fn export_without_scene_is_fatal_but_isolated() {
    let (bridge, hub) = bridge_with_source(empty_source());

    let result = hub.request("publish_scene", b"");
    assert!(matches!(result, Err(Error::Precondition(_))));
    assert!(hub.published("/complete_cloud").is_empty());

    // Frame synchronization is unaffected by the failed export.
    hub.inject("/camera/rgb/image_raw", &color_payload(2, 2, 7));
    hub.inject("/camera/depth/image_raw", &depth_payload(2, 2, 7));
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));
    assert!(bridge.try_take_pair().is_ok());
}

#[test]
fn custom_channel_names_are_respected() {
    let toml = r#"
[channels]
color_image = "/cam/rgb"
depth_image = "/cam/depth"
export = "/surface"
export_request = "dump_surface"
"#;
    let config: BridgeConfig = toml::from_str(toml).unwrap();

    let hub = MockTransport::new();
    let transport: Arc<dyn Transport> = Arc::new(hub.clone());
    let mesh = TriangleMesh::from_triangles(two_triangles());
    let source: Arc<Mutex<dyn MeshSource>> = Arc::new(Mutex::new(StaticMeshSource::new(mesh)));
    let bridge = CameraBridge::new(config, transport, source).unwrap();

    hub.inject("/cam/rgb", &color_payload(2, 2, 4));
    hub.inject("/cam/depth", &depth_payload(2, 2, 4));
    assert!(matches!(bridge.try_take_pair(), Err(Error::NotReady)));
    assert!(bridge.try_take_pair().is_ok());

    hub.request("dump_surface", b"").unwrap();
    assert_eq!(hub.published("/surface").len(), 1);
}
