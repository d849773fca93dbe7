/// Data layer: dataset tables, sensor file decoding, per-frame extraction.
///
/// Architecture:
/// ```text
///  <dataroot>/<version>/*.json        <dataroot>/samples/...
///        │                                   │
///        ▼                                   │
///   ┌──────────┐                             │
///   │  loader   │  tables → NuScenes         │
///   └──────────┘  (token index, reverse      │
///        │         sample → data / anns)     │
///        ▼                                   ▼
///   ┌──────────────┐   ┌─────────────────────────────┐
///   │ scene_samples │   │ point_cloud / camera        │
///   └──────────────┘   │ one sample → EgoPoints,     │
///                      │ CameraFrame + ProjectedBox  │
///                      └─────────────────────────────┘
/// ```

pub mod camera;
pub mod error;
pub mod loader;
pub mod model;
pub mod point_cloud;

#[cfg(test)]
pub mod testutil;

pub use loader::NuScenes;
