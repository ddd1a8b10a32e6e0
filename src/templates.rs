pub const CLIENT_CWL_TEMPLATE: &str = include_str!("../templates/client.cwl.j2");
pub const CLIENT_CWL_TEMPLATE_NAME: &str = "client.cwl.j2";
