mod department_dto;

pub use department_dto::{
    CreateDepartmentDto, DepartmentResponseDto, ServiceAreaDto, ServiceAreaResponseDto,
};
