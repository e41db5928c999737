use crate::face::FaceId;
use crate::math::FVector;

/// Structural failures raised while a polyhedron's topology is being rebuilt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// An edge was appended to a side but does not start where the side's boundary ends.
    #[error("edge does not continue the boundary of the side")]
    DisconnectedEdge,
    /// A split side had no pair of keep/drop transitions.
    #[error("invalid brush detected during side split")]
    InvalidSideSplit,
    /// The edges created by a plane insertion do not form one closed cycle.
    #[error("new side boundary is not a closed cycle")]
    OpenBoundary,
    #[error("side with {0} edges cannot be chopped")]
    DegenerateSide(usize),
    #[error("sanity check failed: {0}")]
    SanityCheck(String),
    #[error("face {0:?} does not belong to this brush")]
    FaceNotFound(FaceId),
    #[error("brush has no geometry")]
    NoGeometry,
    #[error("no vertex at {0:?}")]
    VertexNotFound(FVector),
    #[error("no edge from {0:?} to {1:?}")]
    EdgeNotFound(FVector, FVector),
    /// The edit moves nothing, or moves it in a direction the edit does not allow.
    #[error("edit has no effect in direction {0:?}")]
    InvalidDirection(FVector),
    /// The points of an edit do not span a volume.
    #[error("points do not enclose a volume")]
    DegenerateHull,
    /// A point the edit placed would end up inside the solid or merged away.
    #[error("vertex at {0:?} would not survive the edit")]
    VertexAbsorbed(FVector),
    #[error("edited brush would leave the world bounds")]
    OutsideWorld,
    #[error("grid size {0} is not positive")]
    InvalidGrid(f32),
}
