mod department;

pub use department::{
    CreateDepartment, CreateServiceArea, Department, DepartmentWithAreas, ServiceArea,
};
