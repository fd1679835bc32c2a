use thiserror::Error;

/// Pipeline stage that hit a fixed capacity.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Stage {
    SceneInput,
    Clipping,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::SceneInput => f.write_str("scene input"),
            Stage::Clipping => f.write_str("clipping"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("{stage} needs room for {requested} triangles but the frame limit is {limit}")]
    CapacityExceeded {
        stage: Stage,
        limit: usize,
        requested: usize,
    },
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: usize, height: usize },
    #[error("invalid texture {width}x{height} with {pixels} pixels")]
    InvalidTexture {
        width: usize,
        height: usize,
        pixels: usize,
    },
}

pub type Result<T> = std::result::Result<T, RenderError>;
