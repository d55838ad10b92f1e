//! 坐标转换命令

use crate::datum::{self, Datum, LngLat};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// 源坐标系 (wgs84 / gcj02 / bd09)
    #[arg(long)]
    pub from: Datum,
    /// 目标坐标系
    #[arg(long)]
    pub to: Datum,
    /// 经度
    #[arg(allow_negative_numbers = true)]
    pub lng: f64,
    /// 纬度
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,
    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ConvertOutput {
    from: Datum,
    to: Datum,
    input: LngLat,
    output: LngLat,
    out_of_china: bool,
}

pub fn convert(args: ConvertArgs) -> anyhow::Result<()> {
    let input = LngLat::new(args.lng, args.lat);
    let output = datum::convert(input, args.from, args.to);
    tracing::debug!(%input, %output, from = %args.from, to = %args.to, "坐标转换");

    if args.json {
        let result = ConvertOutput {
            from: args.from,
            to: args.to,
            input,
            output,
            out_of_china: datum::out_of_china(input.lng, input.lat),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{output}");
    }
    Ok(())
}
