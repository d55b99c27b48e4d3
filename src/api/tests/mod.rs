mod auth_flows;
mod exam_flows;
