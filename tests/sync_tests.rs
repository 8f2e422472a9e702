//! Device Buffer Sync Tests
//!
//! Tests for:
//! - State machine transitions
//! - Full upload on first flush, partial column writes afterwards
//! - Failed uploads keep the buffer dirty
//! - Use after destroy

mod common;

use glam::{Vec2, Vec3};

use common::{RecordingUploader, quad_mesh, strip_mesh};
use facemesh::errors::FaceMeshError;
use facemesh::renderer::{DeviceBufferSync, FlushReport, SyncState};
use facemesh::resources::GeometryBuffer;

#[test]
fn first_flush_allocates_full_buffer() {
    let mut geo = GeometryBuffer::new(quad_mesh());
    let mut uploader = RecordingUploader::new();
    let mut sync = DeviceBufferSync::new("Face");
    assert_eq!(sync.state(), SyncState::Uninitialized);

    let report = sync.flush(&mut geo, &mut uploader).unwrap();

    // 4 vertices * (3 + 3) floats
    assert_eq!(report, FlushReport::Allocated { bytes: 96 });
    assert_eq!(sync.state(), SyncState::Allocated);
    assert_eq!(uploader.creates(), 1);
    assert!(uploader.writes().is_empty());
    assert_eq!(sync.buffer().unwrap().floats(), geo.flattened());
}

#[test]
fn mutation_then_flush_writes_only_dirty_range() {
    let mesh = strip_mesh(4).with_texcoord0(vec![Vec2::ONE; 4]).unwrap();
    let mut geo = GeometryBuffer::new(mesh);
    let mut uploader = RecordingUploader::new();
    let mut sync = DeviceBufferSync::new("Face");
    sync.flush(&mut geo, &mut uploader).unwrap();

    let moved: Vec<Vec3> = geo.positions().iter().map(|p| *p * 2.0).collect();
    geo.replace_positions(&moved, true).unwrap();
    sync.mark_dirty().unwrap();
    assert_eq!(sync.state(), SyncState::Dirty);

    let report = sync.flush(&mut geo, &mut uploader).unwrap();

    // stride 20 bytes; positions span row 0 offset 0 to row 3 offset 12
    assert_eq!(report, FlushReport::Partial { offset: 0, bytes: 72 });
    assert_eq!(uploader.creates(), 1);
    assert_eq!(uploader.writes(), vec![(0, 72)]);
    assert_eq!(sync.state(), SyncState::Clean);
    assert_eq!(sync.buffer().unwrap().floats(), geo.flattened());
}

#[test]
fn flush_without_changes_is_up_to_date() {
    let mut geo = GeometryBuffer::new(quad_mesh());
    let mut uploader = RecordingUploader::new();
    let mut sync = DeviceBufferSync::new("Face");
    sync.flush(&mut geo, &mut uploader).unwrap();

    sync.mark_dirty().unwrap();
    let report = sync.flush(&mut geo, &mut uploader).unwrap();

    assert_eq!(report, FlushReport::UpToDate);
    assert_eq!(sync.state(), SyncState::Clean);
    assert!(uploader.writes().is_empty());
}

#[test]
fn normals_widen_the_written_range() {
    let mut geo = GeometryBuffer::new(quad_mesh());
    let mut uploader = RecordingUploader::new();
    let mut sync = DeviceBufferSync::new("Face");
    sync.flush(&mut geo, &mut uploader).unwrap();

    let moved: Vec<Vec3> = geo.positions().iter().map(|p| Vec3::new(p.x, 0.0, p.y)).collect();
    geo.replace_positions(&moved, true).unwrap();
    sync.mark_dirty().unwrap();
    sync.flush(&mut geo, &mut uploader).unwrap();

    // stride 24; positions and normals cover the whole buffer
    assert_eq!(uploader.writes(), vec![(0, 96)]);
    assert_eq!(sync.buffer().unwrap().floats(), geo.flattened());
}

#[test]
fn failed_upload_stays_dirty_and_retries() {
    let mut geo = GeometryBuffer::new(quad_mesh());
    let mut uploader = RecordingUploader::new();
    let mut sync = DeviceBufferSync::new("Face");
    sync.flush(&mut geo, &mut uploader).unwrap();

    let moved: Vec<Vec3> = geo.positions().iter().map(|p| *p + Vec3::Z).collect();
    geo.replace_positions_no_topology_check(&moved).unwrap();
    sync.mark_dirty().unwrap();

    uploader.fail_writes.set(1);
    let err = sync.flush(&mut geo, &mut uploader).unwrap_err();
    assert!(matches!(err, FaceMeshError::GpuUpload(_)));
    assert!(err.is_recoverable());
    assert_eq!(sync.state(), SyncState::Dirty);

    let report = sync.flush(&mut geo, &mut uploader).unwrap();
    assert!(matches!(report, FlushReport::Partial { .. }));
    assert_eq!(sync.state(), SyncState::Clean);
    assert_eq!(sync.buffer().unwrap().floats(), geo.flattened());
}

#[test]
fn mark_dirty_before_first_flush_is_ignored() {
    let mut sync: DeviceBufferSync<common::MemoryBuffer> = DeviceBufferSync::new("Face");
    sync.mark_dirty().unwrap();
    assert_eq!(sync.state(), SyncState::Uninitialized);
}

#[test]
fn destroyed_buffer_rejects_everything() {
    let mut geo = GeometryBuffer::new(quad_mesh());
    let mut uploader = RecordingUploader::new();
    let mut sync = DeviceBufferSync::new("Face");
    sync.flush(&mut geo, &mut uploader).unwrap();

    sync.destroy(&mut uploader);
    assert_eq!(sync.state(), SyncState::Destroyed);
    assert_eq!(uploader.destroys(), 1);
    assert!(sync.buffer().is_none());

    let err = sync.flush(&mut geo, &mut uploader).unwrap_err();
    assert!(matches!(err, FaceMeshError::UseAfterDestroy(_)));
    assert!(!err.is_recoverable());
    assert!(matches!(sync.mark_dirty(), Err(FaceMeshError::UseAfterDestroy(_))));
}
