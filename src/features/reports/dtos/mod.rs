mod report_dto;

pub use report_dto::{
    CommentDto, CreateReportDto, EscalateDto, ReportResponseDto, ReportUpdateResponseDto,
    UpdateReportStatusDto,
};
