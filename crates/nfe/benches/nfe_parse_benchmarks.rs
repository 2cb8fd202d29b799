use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use nexium_nfe::parse_invoice;

fn invoice_with_items(count: usize) -> String {
    let mut xml = String::from(
        r#"<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe"><NFe><infNFe Id="NFe35240612345678000190550010000012341000012345"><emit><CNPJ>12345678000190</CNPJ><xNome>Depósito Central</xNome></emit>"#,
    );
    for i in 0..count {
        xml.push_str(&format!(
            "<det nItem=\"{n}\"><prod><cProd>P{i:05}</cProd><xProd>Item {i}</xProd><uCom>UN</uCom><qCom>{q}.0000</qCom><vUnCom>{p}.90</vUnCom></prod></det>",
            n = i + 1,
            q = i % 50 + 1,
            p = i % 200,
        ));
    }
    xml.push_str("</infNFe></NFe></nfeProc>");
    xml
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("nfe_parse");
    for count in [1usize, 50, 500] {
        let xml = invoice_with_items(count);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &xml, |b, xml| {
            b.iter(|| parse_invoice(black_box(xml.as_bytes())).map(|inv| inv.items.len()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
