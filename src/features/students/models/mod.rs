mod directory;
mod profile;

pub use directory::{StatusCounts, StatusFilter, StudentFilter, StudentListRow};
pub use profile::{
    ApprovalStatus, EducationRecord, ExtraDocument, FamilyDetails, NamedDocuments, Schooling,
    StudentProfile,
};
